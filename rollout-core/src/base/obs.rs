//! Observations of an environment.
use crate::error::RolloutError;
use ndarray::{Array1, Array2, ArrayD, Axis};
use std::collections::BTreeMap;

/// A field of a structured observation.
#[derive(Clone, Debug, PartialEq)]
pub enum ObsField {
    /// Numeric array of arbitrary rank, e.g., proprioceptive state.
    Flat(ArrayD<f32>),

    /// Camera image, typically `(H, W, C)`; depth and grayscale cameras may
    /// emit `(H, W)`.
    Image(ArrayD<u8>),

    /// Named sub-fields, e.g., a group of cameras under `pixels`.
    Nested(BTreeMap<String, ObsField>),
}

/// Observation emitted by [`Env::reset`](crate::Env::reset) and [`Env::step`](crate::Env::step).
///
/// Each new observation replaces the previous one; the runner never keeps
/// observations beyond the current step.
#[derive(Clone, Debug, PartialEq)]
pub enum Observation {
    /// A single numeric array.
    Flat(ArrayD<f32>),

    /// A mapping from field names to arrays, images or nested groups.
    Structured(BTreeMap<String, ObsField>),
}

/// Borrowed leaf of an observation.
#[derive(Clone, Copy, Debug)]
pub enum Leaf<'a> {
    /// Numeric array.
    Flat(&'a ArrayD<f32>),

    /// Image array.
    Image(&'a ArrayD<u8>),
}

impl Observation {
    /// Builds a flat observation from a vector.
    pub fn from_vec(v: Vec<f32>) -> Self {
        Self::Flat(Array1::from(v).into_dyn())
    }

    /// Returns the field at `path`, e.g., `["pixels", "top"]`.
    ///
    /// Flat observations have no fields.
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&ObsField> {
        let (first, rest) = path.split_first()?;
        let mut field = match self {
            Self::Flat(_) => return None,
            Self::Structured(fields) => fields.get(first.as_ref())?,
        };
        for key in rest {
            field = match field {
                ObsField::Nested(fields) => fields.get(key.as_ref())?,
                _ => return None,
            };
        }
        Some(field)
    }

    /// Mutable version of [`Observation::get`].
    pub fn get_mut<S: AsRef<str>>(&mut self, path: &[S]) -> Option<&mut ObsField> {
        let (first, rest) = path.split_first()?;
        let mut field = match self {
            Self::Flat(_) => return None,
            Self::Structured(fields) => fields.get_mut(first.as_ref())?,
        };
        for key in rest {
            field = match field {
                ObsField::Nested(fields) => fields.get_mut(key.as_ref())?,
                _ => return None,
            };
        }
        Some(field)
    }

    /// Returns the leaves in key order, named by their `/`-separated path.
    ///
    /// The single leaf of a flat observation has an empty name.
    pub fn leaves(&self) -> Vec<(String, Leaf<'_>)> {
        let mut out = vec![];
        match self {
            Self::Flat(arr) => out.push((String::new(), Leaf::Flat(arr))),
            Self::Structured(fields) => collect_leaves(fields, "", &mut out),
        }
        out
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}/{}", prefix, key)
    }
}

fn collect_leaves<'a>(
    fields: &'a BTreeMap<String, ObsField>,
    prefix: &str,
    out: &mut Vec<(String, Leaf<'a>)>,
) {
    for (key, field) in fields.iter() {
        let path = join(prefix, key);
        match field {
            ObsField::Flat(arr) => out.push((path, Leaf::Flat(arr))),
            ObsField::Image(img) => out.push((path, Leaf::Image(img))),
            ObsField::Nested(sub) => collect_leaves(sub, &path, out),
        }
    }
}

/// An [`Observation`] whose leaves share a leading batch axis.
///
/// This is the call interface of [`Policy`](crate::Policy). The runner always
/// submits a batch of size 1.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchedObservation(Observation);

impl BatchedObservation {
    /// Wraps an observation whose leaves already carry a batch axis.
    ///
    /// Fails if a leaf is a scalar or if leading axes differ among leaves.
    pub fn new(obs: Observation) -> Result<Self, RolloutError> {
        obs.validate_batched()?;
        Ok(Self(obs))
    }

    /// Adds a leading axis of size 1 to every leaf of an observation.
    pub(crate) fn from_single(obs: Observation) -> Self {
        let obs = match obs {
            Observation::Flat(arr) => Observation::Flat(arr.insert_axis(Axis(0))),
            Observation::Structured(fields) => Observation::Structured(batch_group(fields)),
        };
        Self(obs)
    }

    /// The batch size, 1 for an observation without leaves.
    pub fn batch_size(&self) -> usize {
        match self.0.leaves().first() {
            Some((_, Leaf::Flat(arr))) => arr.shape()[0],
            Some((_, Leaf::Image(img))) => img.shape()[0],
            None => 1,
        }
    }

    /// The underlying observation, including the batch axis.
    pub fn obs(&self) -> &Observation {
        &self.0
    }

    /// Unwraps the underlying observation.
    pub fn into_inner(self) -> Observation {
        self.0
    }

    /// Concatenates all leaves into a `(batch, features)` matrix.
    ///
    /// Leaves are taken in key order. Image pixels are scaled to `[0, 1]`.
    pub fn features(&self) -> Result<Array2<f32>, RolloutError> {
        let n = self.batch_size();
        let mut rows: Vec<Vec<f32>> = vec![vec![]; n];
        for (_, leaf) in self.0.leaves() {
            match leaf {
                Leaf::Flat(arr) => {
                    for (row, sub) in rows.iter_mut().zip(arr.axis_iter(Axis(0))) {
                        row.extend(sub.iter().cloned());
                    }
                }
                Leaf::Image(img) => {
                    for (row, sub) in rows.iter_mut().zip(img.axis_iter(Axis(0))) {
                        row.extend(sub.iter().map(|&p| p as f32 / 255.0));
                    }
                }
            }
        }
        let d = rows.first().map(|r| r.len()).unwrap_or(0);
        Array2::from_shape_vec((n, d), rows.concat())
            .map_err(|e| RolloutError::MalformedObservation(e.to_string()))
    }
}

impl Observation {
    fn validate_batched(&self) -> Result<(), RolloutError> {
        let mut size = None;
        for (name, leaf) in self.leaves() {
            let shape = match leaf {
                Leaf::Flat(arr) => arr.shape(),
                Leaf::Image(img) => img.shape(),
            };
            let b = *shape.first().ok_or_else(|| {
                RolloutError::MalformedObservation(format!("leaf {:?} has no batch axis", name))
            })?;
            match size {
                None => size = Some(b),
                Some(s) if s != b => {
                    return Err(RolloutError::MalformedObservation(format!(
                        "leaf {:?} has batch size {}, expected {}",
                        name, b, s
                    )))
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn batch_group(fields: BTreeMap<String, ObsField>) -> BTreeMap<String, ObsField> {
    fields
        .into_iter()
        .map(|(key, field)| {
            let field = match field {
                ObsField::Flat(arr) => ObsField::Flat(arr.insert_axis(Axis(0))),
                ObsField::Image(img) => ObsField::Image(img.insert_axis(Axis(0))),
                ObsField::Nested(sub) => ObsField::Nested(batch_group(sub)),
            };
            (key, field)
        })
        .collect()
}
