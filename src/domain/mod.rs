pub mod place;

pub use place::{Coordinate, GeocodeResult, PlaceDetails};
