//! Plot-ready staircase profiles
//!
//! A staircase repeats each layer's value at its top and bottom depth, so
//! drawing the points in order renders the step function of the model.

use serde::{Deserialize, Serialize};

use super::params::Parameter;
use super::stack::LayerStack;
use crate::error::Result;

/// One vertex of a staircase profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    /// Depth (km)
    pub depth: f64,
    pub value: f64,
}

impl LayerStack {
    /// Staircase of `param` for layers whose bottom lies in `(zmin, zmax]`
    ///
    /// # Errors
    /// `IncompatibleParameter` if `param` does not exist for this kind
    pub fn staircase(&self, param: Parameter, zmin: f64, zmax: f64) -> Result<Vec<ProfilePoint>> {
        let values = self.column(param)?;
        let mut points = Vec::new();
        for (i, &bottom) in self.depths().iter().enumerate() {
            if bottom <= zmin || bottom > zmax {
                continue;
            }
            let top = bottom - self.thickness()[i];
            points.push(ProfilePoint {
                depth: top,
                value: values[i],
            });
            points.push(ProfilePoint {
                depth: bottom,
                value: values[i],
            });
        }
        Ok(points)
    }
}
