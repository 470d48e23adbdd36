//! Error types for the ball pit.
//!
//! Per-frame work (physics, drawing) never fails. Errors only come from
//! setting a component up: a missing drawable surface, the window system,
//! GPU initialization, or reading a configuration file.

use std::fmt;

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur while loading or saving a configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or write the file.
    Io(std::io::Error),
    /// The file is not valid configuration JSON.
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Errors that can occur when creating or running a ball pit.
#[derive(Debug)]
pub enum BallpitError {
    /// No drawable surface was given to the builder.
    NoSurface,
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Configuration could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for BallpitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BallpitError::NoSurface => write!(f, "No drawable surface provided. Use .with_surface() to set one."),
            BallpitError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            BallpitError::Window(e) => write!(f, "Failed to create window: {}", e),
            BallpitError::Gpu(e) => write!(f, "GPU error: {}", e),
            BallpitError::Config(e) => write!(f, "Config error: {}", e),
        }
    }
}

impl std::error::Error for BallpitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BallpitError::NoSurface => None,
            BallpitError::EventLoop(e) => Some(e),
            BallpitError::Window(e) => Some(e),
            BallpitError::Gpu(e) => Some(e),
            BallpitError::Config(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for BallpitError {
    fn from(e: winit::error::EventLoopError) -> Self {
        BallpitError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for BallpitError {
    fn from(e: winit::error::OsError) -> Self {
        BallpitError::Window(e)
    }
}

impl From<GpuError> for BallpitError {
    fn from(e: GpuError) -> Self {
        BallpitError::Gpu(e)
    }
}

impl From<ConfigError> for BallpitError {
    fn from(e: ConfigError) -> Self {
        BallpitError::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_no_surface_message_points_at_builder() {
        let err = BallpitError::NoSurface;
        assert!(err.to_string().contains("with_surface"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_config_error_keeps_source() {
        let parse = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = BallpitError::from(ConfigError::from(parse));
        assert!(err.to_string().starts_with("Config error"));
        assert!(err.source().is_some());
    }
}
