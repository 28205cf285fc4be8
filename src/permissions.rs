use crate::errors::FaceCaptureError;

/// Permission status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PermissionStatus {
    /// Permission granted
    Granted,
    /// Permission denied
    Denied,
    /// Permission not determined (no device, or the platform cannot tell)
    NotDetermined,
}

impl std::fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionStatus::Granted => write!(f, "granted"),
            PermissionStatus::Denied => write!(f, "denied"),
            PermissionStatus::NotDetermined => write!(f, "not_determined"),
        }
    }
}

/// Detailed permission information
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PermissionInfo {
    pub status: PermissionStatus,
    pub message: String,
    pub devices: Vec<String>,
}

impl PermissionInfo {
    /// `CameraUnavailable` unless access is granted.
    pub fn require_granted(&self) -> Result<(), FaceCaptureError> {
        match self.status {
            PermissionStatus::Granted => Ok(()),
            _ => Err(FaceCaptureError::CameraUnavailable(self.message.clone())),
        }
    }
}

/// Check camera permission status
pub fn check_permission() -> PermissionStatus {
    check_permission_detailed().status
}

/// Check camera permission status with detailed information
pub fn check_permission_detailed() -> PermissionInfo {
    #[cfg(target_os = "linux")]
    {
        check_permission_linux()
    }

    #[cfg(all(not(target_os = "linux"), feature = "native-camera"))]
    {
        check_permission_native()
    }

    #[cfg(all(not(target_os = "linux"), not(feature = "native-camera")))]
    {
        PermissionInfo {
            status: PermissionStatus::NotDetermined,
            message: "Built without native camera support".to_string(),
            devices: Vec::new(),
        }
    }
}

#[cfg(all(not(target_os = "linux"), feature = "native-camera"))]
fn check_permission_native() -> PermissionInfo {
    // Enumerating devices succeeds only once the OS privacy prompt allowed it
    match crate::camera::native::list_device_indexes() {
        Ok(devices) if !devices.is_empty() => PermissionInfo {
            status: PermissionStatus::Granted,
            message: format!("{} camera(s) accessible", devices.len()),
            devices: devices.iter().map(|i| i.to_string()).collect(),
        },
        Ok(_) => PermissionInfo {
            status: PermissionStatus::NotDetermined,
            message: "No cameras found - permission may not be granted".to_string(),
            devices: Vec::new(),
        },
        Err(e) => PermissionInfo {
            status: PermissionStatus::Denied,
            message: format!("Camera access denied: {}", e),
            devices: Vec::new(),
        },
    }
}

#[cfg(target_os = "linux")]
fn check_permission_linux() -> PermissionInfo {
    use std::fs;
    use std::path::Path;

    let video_devices: Vec<String> = (0..10)
        .map(|i| format!("/dev/video{}", i))
        .filter(|path| Path::new(path).exists())
        .collect();

    if video_devices.is_empty() {
        return PermissionInfo {
            status: PermissionStatus::NotDetermined,
            message: "No video devices found at /dev/video*".to_string(),
            devices: video_devices,
        };
    }

    let first_device = video_devices[0].clone();
    match fs::OpenOptions::new().read(true).open(&first_device) {
        Ok(_) => PermissionInfo {
            status: PermissionStatus::Granted,
            message: format!("Camera access granted ({} readable)", first_device),
            devices: video_devices,
        },
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            let hint = if check_linux_group_membership() {
                String::new()
            } else {
                " - run: sudo usermod -a -G video $USER".to_string()
            };
            PermissionInfo {
                status: PermissionStatus::Denied,
                message: format!("Cannot open {}: {}{}", first_device, e, hint),
                devices: video_devices,
            }
        }
        Err(e) => PermissionInfo {
            status: PermissionStatus::Denied,
            message: format!("Cannot access {}: {}", first_device, e),
            devices: video_devices,
        },
    }
}

#[cfg(target_os = "linux")]
fn check_linux_group_membership() -> bool {
    use std::process::Command;

    let output = Command::new("groups").output().ok();

    if let Some(output) = output {
        if let Ok(groups) = String::from_utf8(output.stdout) {
            return groups
                .split_whitespace()
                .any(|g| g == "video" || g == "plugdev");
        }
    }

    false
}
