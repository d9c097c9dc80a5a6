mod api;
mod properties;
mod scenarios;
