// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Metric Space Contract
//!
//! Every indexed value implements [`MetricPoint`]. The vantage-point tree
//! prunes subtrees with the triangle inequality, so an implementation that
//! is not a true metric yields approximate (not exact) neighbor results.
//! Such types must say so through [`MetricPoint::IS_METRIC`].

use rand::Rng;
use std::fmt;
use thiserror::Error;

/// Absolute tolerance used when checking metric axioms on `f64` distances
const METRIC_EPSILON: f64 = 1e-9;

/// A value with a distance to other values of the same kind.
///
/// Implementations are expected to be non-negative and symmetric, and to
/// satisfy the triangle inequality when `IS_METRIC` is `true`.
pub trait MetricPoint: Clone + fmt::Debug + Send + Sync + 'static {
    /// Whether `distance` is a true metric for every pair of values.
    const IS_METRIC: bool;

    fn distance(&self, other: &Self) -> f64;
}

/// First metric axiom found broken by [`verify_metric_space`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricViolation {
    #[error("negative distance {distance} between points {a} and {b}")]
    Negative { a: usize, b: usize, distance: f64 },

    #[error("asymmetric distance between points {a} and {b}: {forward} vs {backward}")]
    Asymmetric {
        a: usize,
        b: usize,
        forward: f64,
        backward: f64,
    },

    #[error("triangle inequality broken for points {a}, {b}, {c}: d(a,c)={direct} > d(a,b)+d(b,c)={detour}")]
    Triangle {
        a: usize,
        b: usize,
        c: usize,
        direct: f64,
        detour: f64,
    },
}

fn check_triple<P: MetricPoint>(points: &[P], a: usize, b: usize, c: usize) -> Result<(), MetricViolation> {
    let ab = points[a].distance(&points[b]);
    let ba = points[b].distance(&points[a]);
    if ab < 0.0 {
        return Err(MetricViolation::Negative { a, b, distance: ab });
    }
    if (ab - ba).abs() > METRIC_EPSILON {
        return Err(MetricViolation::Asymmetric {
            a,
            b,
            forward: ab,
            backward: ba,
        });
    }

    let bc = points[b].distance(&points[c]);
    let ac = points[a].distance(&points[c]);
    if ac > ab + bc + METRIC_EPSILON {
        return Err(MetricViolation::Triangle {
            a,
            b,
            c,
            direct: ac,
            detour: ab + bc,
        });
    }
    Ok(())
}

/// Check the metric axioms over `points`.
///
/// When the number of ordered triples is at most `samples` every triple is
/// checked; otherwise `samples` random triples are drawn.
pub fn verify_metric_space<P: MetricPoint>(points: &[P], samples: usize) -> Result<(), MetricViolation> {
    let n = points.len();
    if n < 2 {
        return Ok(());
    }

    let triples = n.saturating_mul(n).saturating_mul(n);
    if triples <= samples {
        for a in 0..n {
            for b in 0..n {
                for c in 0..n {
                    check_triple(points, a, b, c)?;
                }
            }
        }
        return Ok(());
    }

    let mut rng = rand::thread_rng();
    for _ in 0..samples {
        let a = rng.gen_range(0..n);
        let b = rng.gen_range(0..n);
        let c = rng.gen_range(0..n);
        check_triple(points, a, b, c)?;
    }
    Ok(())
}
