//! Framework module map writer.

use crate::error::OverlayError;

#[derive(Debug, Clone, Default)]
pub struct ModuleMapDescriptor {
    framework_module_name: Option<String>,
    umbrella_header: Option<String>,
}

impl ModuleMapDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_framework_module_name(&mut self, name: &str) -> Result<(), OverlayError> {
        if name.is_empty() {
            return Err(OverlayError::InvalidArguments(
                "framework module name is empty".to_string(),
            ));
        }
        self.framework_module_name = Some(name.to_string());
        Ok(())
    }

    pub fn set_umbrella_header(&mut self, header: &str) -> Result<(), OverlayError> {
        if header.is_empty() {
            return Err(OverlayError::InvalidArguments(
                "umbrella header is empty".to_string(),
            ));
        }
        self.umbrella_header = Some(header.to_string());
        Ok(())
    }

    pub fn write_to_buffer(&self) -> Result<String, OverlayError> {
        let name = self.framework_module_name.as_deref().ok_or_else(|| {
            OverlayError::InvalidArguments("framework module name not set".to_string())
        })?;
        let header = self
            .umbrella_header
            .as_deref()
            .ok_or_else(|| OverlayError::InvalidArguments("umbrella header not set".to_string()))?;
        Ok(format!(
            "framework module {name} {{\n  umbrella header \"{}\"\n\n  export *\n  module * {{ export * }}\n}}\n",
            header.escape_default()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_name_and_header() {
        let mut descriptor = ModuleMapDescriptor::new();
        assert!(descriptor.write_to_buffer().is_err());
        descriptor.set_framework_module_name("Frame").unwrap();
        assert!(descriptor.write_to_buffer().is_err());
        descriptor.set_umbrella_header("Frame.h").unwrap();
        assert!(descriptor.write_to_buffer().is_ok());
    }
}
