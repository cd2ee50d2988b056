//! Camera transport driving the `gphoto2` command-line binary
//!
//! No native libgphoto2 binding is linked; instead each operation shells
//! out to the `gphoto2` binary and parses its output. Availability of the
//! binary is probed exactly once at startup via [`GPhotoTransport::locate`];
//! everything above this module is generic over [`CameraTransport`] and
//! never sees the concrete transport.

use crate::core::error::{Result, SkycamError};
use crate::device::traits::{Axis, CameraHandle, CameraTransport, CapturedFrame, PortInfo};
use log::{debug, trace};
use std::process::{Command, Output};

const GPHOTO2_BINARY: &str = "gphoto2";

/// Transport backed by the `gphoto2` binary
#[derive(Debug, Clone)]
pub struct GPhotoTransport {
    binary: String,
}

impl GPhotoTransport {
    /// Probe for the `gphoto2` binary once at startup.
    ///
    /// Returns `None` when the binary is missing or not runnable, in which
    /// case no camera operations are possible for this invocation.
    pub fn locate() -> Option<Self> {
        let transport = Self {
            binary: GPHOTO2_BINARY.to_string(),
        };
        match Command::new(&transport.binary).arg("--version").output() {
            Ok(output) if output.status.success() => {
                debug!("Found gphoto2 binary");
                Some(transport)
            }
            _ => None,
        }
    }

    #[cfg(test)]
    fn with_binary(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        trace!("Running {} {}", self.binary, args.join(" "));
        let output: Output = Command::new(&self.binary).args(args).output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SkycamError::Transport(format!(
                "gphoto2 {} failed: {}",
                args.first().unwrap_or(&""),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl CameraTransport for GPhotoTransport {
    type Handle = GPhotoCamera;

    fn detect(&self) -> Result<Vec<PortInfo>> {
        let output = self.run(&["--auto-detect"])?;
        Ok(parse_auto_detect(&output))
    }

    fn open(&self, port: &str) -> Result<Self::Handle> {
        // A summary query doubles as the init handshake: it fails fast when
        // the port is wrong or the camera is busy.
        self.run(&["--port", port, "--summary"])
            .map_err(|e| SkycamError::DeviceConnectionFailed {
                port: port.to_string(),
                message: e.to_string(),
            })?;
        Ok(GPhotoCamera {
            transport: self.clone(),
            port: port.to_string(),
        })
    }
}

/// One camera reachable through the `gphoto2` binary.
///
/// The binary opens and releases the USB device per invocation, so the
/// handle itself holds no OS resource; `close` only marks the lifecycle.
#[derive(Debug)]
pub struct GPhotoCamera {
    transport: GPhotoTransport,
    port: String,
}

impl CameraHandle for GPhotoCamera {
    fn legal_values(&mut self, axis: Axis) -> Result<Vec<String>> {
        let output = self
            .transport
            .run(&["--port", &self.port, "--get-config", axis.property()])?;
        let choices = parse_choices(&output);
        if choices.is_empty() {
            return Err(SkycamError::Transport(format!(
                "property '{}' reported no choices",
                axis.property()
            )));
        }
        Ok(choices)
    }

    fn set_value(&mut self, axis: Axis, value: &str) -> Result<()> {
        let assignment = format!("{}={}", axis.property(), value);
        self.transport
            .run(&["--port", &self.port, "--set-config", &assignment])?;
        Ok(())
    }

    fn capture(&mut self, suggested_name: Option<&str>) -> Result<CapturedFrame> {
        // The camera keeps the file on its own storage; gphoto2 prints
        // where it ended up. Suggested names only inform logging since the
        // camera controls on-storage naming.
        if let Some(name) = suggested_name {
            trace!("Capturing frame (suggested name {})", name);
        }
        let output = self
            .transport
            .run(&["--port", &self.port, "--capture-image"])
            .map_err(|e| SkycamError::CaptureFailed(e.to_string()))?;
        parse_capture_location(&output).ok_or_else(|| {
            SkycamError::CaptureFailed("gphoto2 reported no file location".to_string())
        })
    }

    fn close(&mut self) {
        // Nothing to release; the binary holds the device only per command.
    }
}

/// Parse `gphoto2 --auto-detect` output.
///
/// The listing is two header lines followed by `Model ... Port` columns,
/// the port being the last whitespace-separated token.
pub fn parse_auto_detect(output: &str) -> Vec<PortInfo> {
    output
        .lines()
        .skip(2)
        .filter_map(|line| {
            let line = line.trim_end();
            let port_start = line.rfind(char::is_whitespace)?;
            let port = line[port_start..].trim();
            let model = line[..port_start].trim();
            if model.is_empty() || !port.contains(':') {
                return None;
            }
            Some(PortInfo::new(port, model))
        })
        .collect()
}

/// Parse the `Choice: N value` lines of `gphoto2 --get-config`
pub fn parse_choices(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix("Choice:")?;
            let mut parts = rest.trim().splitn(2, char::is_whitespace);
            let _index = parts.next()?;
            Some(parts.next()?.trim().to_string())
        })
        .collect()
}

/// Parse the `New file is in location ... on the camera` line printed by
/// `gphoto2 --capture-image`
pub fn parse_capture_location(output: &str) -> Option<CapturedFrame> {
    let line = output
        .lines()
        .find(|line| line.starts_with("New file is in location"))?;
    let location = line
        .trim_start_matches("New file is in location")
        .trim_end_matches("on the camera")
        .trim()
        .trim_end_matches('.');
    let (path, name) = location.rsplit_once('/')?;
    Some(CapturedFrame {
        file_name: name.to_string(),
        file_path: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auto_detect() {
        let output = "\
Model                          Port
----------------------------------------------------------
Canon EOS R6                   usb:001,004
Nikon Z6 II                    usb:001,007
";
        let ports = parse_auto_detect(output);
        assert_eq!(
            ports,
            vec![
                PortInfo::new("usb:001,004", "Canon EOS R6"),
                PortInfo::new("usb:001,007", "Nikon Z6 II"),
            ]
        );
    }

    #[test]
    fn test_parse_auto_detect_empty_listing() {
        let output = "\
Model                          Port
----------------------------------------------------------
";
        assert!(parse_auto_detect(output).is_empty());
    }

    #[test]
    fn test_parse_choices() {
        let output = "\
Label: Shutter Speed
Readonly: 0
Type: RADIO
Current: 8s
Choice: 0 bulb
Choice: 1 30s
Choice: 2 15s
Choice: 3 8s
END
";
        assert_eq!(parse_choices(output), vec!["bulb", "30s", "15s", "8s"]);
    }

    #[test]
    fn test_parse_capture_location() {
        let output = "New file is in location /store_00010001/DCIM/100CANON/IMG_0042.CR2 on the camera\n";
        let frame = parse_capture_location(output).unwrap();
        assert_eq!(frame.file_name, "IMG_0042.CR2");
        assert_eq!(frame.file_path, "/store_00010001/DCIM/100CANON");

        assert!(parse_capture_location("ERROR: could not claim the USB device").is_none());
    }

    #[test]
    fn test_locate_missing_binary_is_none() {
        let transport = GPhotoTransport::with_binary("definitely-not-a-real-binary");
        assert!(transport.run(&["--version"]).is_err());
    }
}
