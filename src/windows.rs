//! The window resolver: spec.md §4.2.

use crate::error::GeneralStatError;
use crate::sequence::TreeSequence;

/// A window specification, as accepted by [`crate::general_stat`] and the
/// convenience statistics.
#[derive(Debug, Clone)]
pub enum Windows {
    /// `None` in spec.md §4.2: a single window spanning the whole sequence.
    Unspecified,
    /// The literal `"trees"`: one window per local tree.
    Trees,
    /// The literal `"sites"`: one window per site, handled specially by the
    /// site engine (spec.md §4.2, §6).
    Sites,
    /// An explicit, non-decreasing sequence starting at `0` and ending at
    /// `L`.
    Explicit(Vec<f64>),
}

impl Windows {
    /// Resolve this specification into a sorted array of `W + 1`
    /// boundaries, per spec.md §4.2. `"sites"` is resolved into `num_sites`
    /// windows centred on each site (boundaries sit midway between
    /// consecutive sites, per §4.2's "centred on sites"), so that a tree
    /// sequence with `n` sites always produces exactly `n` windows — the
    /// caller is responsible for treating per-site output specially (no
    /// span-normalisation).
    pub fn resolve(&self, ts: &TreeSequence) -> Result<Vec<f64>, GeneralStatError> {
        let l = ts.sequence_length();
        match self {
            Windows::Unspecified => Ok(vec![0.0, l]),
            Windows::Trees => Ok(ts.breakpoints().to_vec()),
            Windows::Sites => {
                let sites = ts.sites();
                if sites.is_empty() {
                    return Ok(vec![0.0, l]);
                }
                let mut boundaries = vec![0.0];
                for pair in sites.windows(2) {
                    boundaries.push((pair[0].position + pair[1].position) / 2.0);
                }
                boundaries.push(l);
                Ok(boundaries)
            }
            Windows::Explicit(boundaries) => {
                validate_explicit(boundaries, l)?;
                Ok(boundaries.clone())
            }
        }
    }

    /// `true` for the `"sites"` literal, which the engines must not
    /// span-normalise even when the caller asked for it (spec.md §6).
    pub fn is_sites(&self) -> bool {
        matches!(self, Windows::Sites)
    }
}

fn validate_explicit(boundaries: &[f64], sequence_length: f64) -> Result<(), GeneralStatError> {
    if boundaries.len() < 2 {
        return Err(GeneralStatError::InvalidWindows {
            reason: "windows must have at least two boundaries".to_string(),
        });
    }
    if boundaries[0] != 0.0 {
        return Err(GeneralStatError::InvalidWindows {
            reason: format!("windows must start at 0 (got {})", boundaries[0]),
        });
    }
    if *boundaries.last().unwrap() != sequence_length {
        return Err(GeneralStatError::InvalidWindows {
            reason: format!(
                "windows must end at the sequence length {} (got {})",
                sequence_length,
                boundaries.last().unwrap()
            ),
        });
    }
    for pair in boundaries.windows(2) {
        if !(pair[0] < pair[1]) {
            return Err(GeneralStatError::InvalidWindows {
                reason: format!(
                    "windows must be strictly increasing (got {} then {})",
                    pair[0], pair[1]
                ),
            });
        }
    }
    Ok(())
}

impl std::convert::TryFrom<&str> for Windows {
    type Error = GeneralStatError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "trees" => Ok(Windows::Trees),
            "sites" => Ok(Windows::Sites),
            other => Err(GeneralStatError::InvalidWindows {
                reason: format!("unrecognised window literal {other:?}"),
            }),
        }
    }
}
