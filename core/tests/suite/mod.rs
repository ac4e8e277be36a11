// Aggregates the composer integration tests as modules.

mod fixtures;
mod lifecycle;
mod notes;
mod palette;
mod recipients;
