//! Observation adapter.
//!
//! Turns raw observations of an environment into the batched form that
//! [`Policy::sample_actions`](crate::Policy::sample_actions) consumes.
mod config;
mod resize;
pub use config::{Interpolation, ObsAdapterConfig};
#[cfg(feature = "image")]
pub use resize::ImageOpsResizer;
pub use resize::{default_resizer, resize_area, ImageResize};

use crate::{error::ResizeError, BatchedObservation, ObsField, Observation};
use ndarray::{ArrayD, Ix3};

/// Adds a leading axis of size 1 to every leaf of `obs`.
///
/// The structure of `obs` is preserved, including empty groups. Leaves of
/// any rank are accepted.
pub fn batch(obs: Observation) -> BatchedObservation {
    BatchedObservation::from_single(obs)
}

/// Normalizes observations before they are fed to a policy.
///
/// If the observation has an image at the configured path whose size differs
/// from the target size, the image is resized. Then [`batch`] is applied.
pub struct ObsAdapter {
    config: ObsAdapterConfig,
    resizer: Option<Box<dyn ImageResize>>,
}

impl ObsAdapter {
    /// Constructs an adapter with the resize backend compiled into the crate.
    pub fn new(config: ObsAdapterConfig) -> Self {
        Self {
            config,
            resizer: default_resizer(),
        }
    }

    /// Replaces the resize backend. `None` disables resizing.
    pub fn with_resizer(mut self, resizer: Option<Box<dyn ImageResize>>) -> Self {
        self.resizer = resizer;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ObsAdapterConfig {
        &self.config
    }

    /// Resizes the designated image of `obs` if needed.
    ///
    /// Returns `Ok(None)` when there is nothing to do: resizing is disabled,
    /// the field is absent or not an image, or the image already has the
    /// target size.
    pub fn resize_image(&self, obs: &Observation) -> Result<Option<ArrayD<u8>>, ResizeError> {
        let [height, width] = match self.config.image_hw {
            Some(hw) => hw,
            None => return Ok(None),
        };
        let img = match obs.get(self.config.image_path.as_slice()) {
            Some(ObsField::Image(img)) => img,
            _ => return Ok(None),
        };
        // Only (H, W, C) images are resized
        let img = match img.view().into_dimensionality::<Ix3>() {
            Ok(img) => img,
            Err(_) => return Ok(None),
        };
        let (h, w, _) = img.dim();
        if (h, w) == (height as usize, width as usize) {
            return Ok(None);
        }
        let resizer = self.resizer.as_ref().ok_or(ResizeError::Unavailable)?;
        let out = resizer.resize(img, height, width, self.config.interpolation)?;
        Ok(Some(out.into_dyn()))
    }

    /// Resizes and batches an observation.
    pub fn adapt(&self, obs: Observation) -> BatchedObservation {
        let mut obs = obs;

        // Resizing is best effort: any failure leaves the image as it is.
        match self.resize_image(&obs) {
            Ok(Some(img)) => {
                if let Some(field) = obs.get_mut(self.config.image_path.as_slice()) {
                    *field = ObsField::Image(img);
                }
            }
            Ok(None) => {}
            Err(e) => log::trace!("Image is not resized: {}", e),
        }

        batch(obs)
    }
}

impl Default for ObsAdapter {
    fn default() -> Self {
        Self::new(ObsAdapterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, ArrayD, IxDyn};
    use std::collections::BTreeMap;

    fn pixel_obs(h: usize, w: usize) -> Observation {
        let mut pixels = BTreeMap::new();
        pixels.insert(
            "top".to_string(),
            ObsField::Image(Array3::from_elem((h, w, 3), 10u8).into_dyn()),
        );
        pixels.insert(
            "side".to_string(),
            ObsField::Image(Array3::from_elem((h, w, 3), 20u8).into_dyn()),
        );
        let mut fields = BTreeMap::new();
        fields.insert(
            "agent_pos".to_string(),
            ObsField::Flat(ArrayD::from_shape_vec(IxDyn(&[3]), vec![1., 2., 3.]).unwrap()),
        );
        fields.insert("pixels".to_string(), ObsField::Nested(pixels));
        Observation::Structured(fields)
    }

    fn shape_of(obs: &Observation, path: &[&str]) -> Vec<usize> {
        match obs.get(path) {
            Some(ObsField::Flat(a)) => a.shape().to_vec(),
            Some(ObsField::Image(a)) => a.shape().to_vec(),
            _ => panic!("no leaf at {:?}", path),
        }
    }

    struct FailingResizer;

    impl ImageResize for FailingResizer {
        fn resize(
            &self,
            _img: ndarray::ArrayView3<u8>,
            _height: u32,
            _width: u32,
            _interpolation: Interpolation,
        ) -> Result<ndarray::Array3<u8>, ResizeError> {
            Err(ResizeError::UnsupportedChannels(0))
        }
    }

    #[test]
    fn test_batch_adds_leading_axis_to_every_leaf() {
        let obs = pixel_obs(6, 8);
        let batched = batch(obs.clone());
        assert_eq!(batched.batch_size(), 1);
        let inner = batched.obs();
        assert_eq!(shape_of(inner, &["agent_pos"]), vec![1, 3]);
        assert_eq!(shape_of(inner, &["pixels", "top"]), vec![1, 6, 8, 3]);
        assert_eq!(shape_of(inner, &["pixels", "side"]), vec![1, 6, 8, 3]);

        let names = |o: &Observation| o.leaves().into_iter().map(|(n, _)| n).collect::<Vec<_>>();
        assert_eq!(names(&obs), names(inner));
    }

    #[test]
    fn test_batch_flat() {
        let batched = batch(Observation::from_vec(vec![0.5; 7]));
        match batched.obs() {
            Observation::Flat(a) => assert_eq!(a.shape(), &[1, 7]),
            _ => panic!(),
        }
    }

    fn with_top(shape: &[usize]) -> Observation {
        let mut obs = pixel_obs(6, 8);
        if let Some(f) = obs.get_mut(&["pixels", "top"]) {
            *f = ObsField::Image(ArrayD::from_elem(IxDyn(shape), 7u8));
        }
        obs
    }

    #[test]
    fn test_batch_images_of_any_shape() {
        for shape in [vec![48, 64], vec![48, 64, 2], vec![48, 64, 6]].iter() {
            let batched = batch(with_top(shape));
            let mut expected = vec![1];
            expected.extend(shape.iter().cloned());
            assert_eq!(shape_of(batched.obs(), &["pixels", "top"]), expected);
        }
    }

    #[test]
    fn test_batch_empty_group() {
        let batched = batch(Observation::Structured(BTreeMap::new()));
        assert_eq!(batched.obs(), &Observation::Structured(BTreeMap::new()));
        assert_eq!(batched.batch_size(), 1);
    }

    #[test]
    fn test_adapt_keeps_images_it_cannot_resize() {
        let adapter = ObsAdapter::new(ObsAdapterConfig::default().image_hw(Some([24, 32])));
        let obs = with_top(&[48, 64]);
        assert!(adapter.resize_image(&obs).unwrap().is_none());
        let batched = adapter.adapt(obs);
        assert_eq!(shape_of(batched.obs(), &["pixels", "top"]), vec![1, 48, 64]);
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_adapt_keeps_image_with_unsupported_channels() {
        let adapter = ObsAdapter::new(
            ObsAdapterConfig::default()
                .image_hw(Some([24, 32]))
                .interpolation(Interpolation::Triangle),
        );
        let obs = with_top(&[48, 64, 2]);
        assert!(matches!(
            adapter.resize_image(&obs),
            Err(ResizeError::UnsupportedChannels(2))
        ));
        let batched = adapter.adapt(obs);
        assert_eq!(shape_of(batched.obs(), &["pixels", "top"]), vec![1, 48, 64, 2]);
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_adapt_resizes_only_designated_image() {
        let adapter = ObsAdapter::new(ObsAdapterConfig::default().image_hw(Some([24, 32])));
        let batched = adapter.adapt(pixel_obs(48, 64));
        let inner = batched.obs();
        assert_eq!(shape_of(inner, &["pixels", "top"]), vec![1, 24, 32, 3]);
        assert_eq!(shape_of(inner, &["pixels", "side"]), vec![1, 48, 64, 3]);
        assert_eq!(shape_of(inner, &["agent_pos"]), vec![1, 3]);
        match inner.get(&["pixels", "top"]) {
            Some(ObsField::Image(img)) => assert!(img.iter().all(|&p| p == 10)),
            _ => panic!(),
        }
    }

    #[test]
    fn test_adapt_without_backend_keeps_image() {
        let adapter = ObsAdapter::new(ObsAdapterConfig::default().image_hw(Some([24, 32])))
            .with_resizer(None);
        let obs = pixel_obs(48, 64);
        assert!(matches!(
            adapter.resize_image(&obs),
            Err(ResizeError::Unavailable)
        ));
        let batched = adapter.adapt(obs);
        assert_eq!(shape_of(batched.obs(), &["pixels", "top"]), vec![1, 48, 64, 3]);
    }

    #[test]
    fn test_adapt_swallows_resize_failure() {
        let adapter = ObsAdapter::new(ObsAdapterConfig::default().image_hw(Some([24, 32])))
            .with_resizer(Some(Box::new(FailingResizer)));
        let batched = adapter.adapt(pixel_obs(48, 64));
        assert_eq!(shape_of(batched.obs(), &["pixels", "top"]), vec![1, 48, 64, 3]);
    }

    #[test]
    fn test_adapt_skips_absent_field() {
        let adapter = ObsAdapter::new(
            ObsAdapterConfig::default()
                .image_path(vec!["camera", "front"])
                .image_hw(Some([24, 32])),
        )
        .with_resizer(Some(Box::new(FailingResizer)));
        let obs = pixel_obs(48, 64);
        assert!(adapter.resize_image(&obs).unwrap().is_none());
        let flat = Observation::from_vec(vec![1.0, 2.0]);
        assert!(adapter.resize_image(&flat).unwrap().is_none());
    }

    #[test]
    fn test_adapt_skips_matching_size() {
        let adapter = ObsAdapter::new(ObsAdapterConfig::default().image_hw(Some([48, 64])))
            .with_resizer(Some(Box::new(FailingResizer)));
        assert!(adapter.resize_image(&pixel_obs(48, 64)).unwrap().is_none());
    }
}
