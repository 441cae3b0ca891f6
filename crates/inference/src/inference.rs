use {
    crate::{
        InferError,
        depth::{ModelName, Monodepth2},
    },
    candle_core::Device,
    std::path::Path,
};

/// Where tensors live. Picked once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceChoice {
    Cpu,
    Cuda(usize),
}

impl DeviceChoice {
    /// CUDA device 0 when it is usable and not disabled, CPU otherwise.
    pub fn resolve(no_cuda: bool) -> Self {
        if !no_cuda && candle_core::utils::cuda_is_available() {
            DeviceChoice::Cuda(0)
        } else {
            DeviceChoice::Cpu
        }
    }
}

#[derive(Debug)]
pub struct Inference {
    device: Device,
}

impl Inference {
    pub fn new(choice: DeviceChoice) -> Result<Self, InferError> {
        match choice {
            DeviceChoice::Cpu => Self::cpu(),
            #[cfg(feature = "cuda")]
            DeviceChoice::Cuda(ordinal) => Self::cuda(ordinal),
            #[cfg(not(feature = "cuda"))]
            DeviceChoice::Cuda(_) => Err(InferError::Runtime(
                "CUDA feature not enabled".to_string(),
            )),
        }
    }

    pub fn cpu() -> Result<Self, InferError> {
        base::log_info!("Inference device: CPU");
        Ok(Self {
            device: Device::Cpu,
        })
    }

    #[cfg(feature = "cuda")]
    pub fn cuda(ordinal: usize) -> Result<Self, InferError> {
        let device = Device::new_cuda(ordinal)?;
        if device.is_cuda() {
            base::log_info!("Inference device: CUDA (ordinal {})", ordinal);
        } else {
            base::log_warn!(
                "Inference device: requested CUDA ordinal {} but device reports non-CUDA",
                ordinal
            );
        }
        Ok(Self { device })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Load a Monodepth2 model from `<models_dir>/<name>/`.
    pub fn use_monodepth2(
        &self,
        models_dir: impl AsRef<Path>,
        name: ModelName,
    ) -> Result<Monodepth2, InferError> {
        let model_dir = models_dir.as_ref().join(name.as_str());
        base::log_info!("Loading model from {}", model_dir.display());
        Monodepth2::from_dir(&model_dir, name, self.device.clone())
    }
}
