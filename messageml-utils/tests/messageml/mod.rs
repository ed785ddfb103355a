mod content_model;
mod dialects;
mod scenarios;
