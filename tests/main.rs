mod common;
mod derive;
mod examples;
mod fail;
mod laws;
