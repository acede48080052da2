//! The scalar field interface installed into the host generator's noise slots.

use std::sync::Arc;

/// A scalar field over grid coordinates.
pub trait Field2D: Send + Sync {
    fn value(&self, x: f64, z: f64) -> f64;
}

impl<F: Field2D + ?Sized> Field2D for &F {
    fn value(&self, x: f64, z: f64) -> f64 {
        (**self).value(x, z)
    }
}

impl<F: Field2D + ?Sized> Field2D for Box<F> {
    fn value(&self, x: f64, z: f64) -> f64 {
        (**self).value(x, z)
    }
}

impl<F: Field2D + ?Sized> Field2D for Arc<F> {
    fn value(&self, x: f64, z: f64) -> f64 {
        (**self).value(x, z)
    }
}
