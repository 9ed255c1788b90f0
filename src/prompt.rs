use anyhow::{Context, Result};
use dialoguer::{Input, Password, Select, theme::ColorfulTheme};
use tracing::info;

use crate::aws::Role;
use crate::onelogin::MfaDevice;

/// Ask for the user's OneLogin password, without echo
pub fn password() -> Result<String> {
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt("OneLogin Password")
        .interact()
        .context("Failed to read password")
}

/// Pick one role from the filtered, sorted list
///
/// A single candidate is selected automatically; otherwise the user chooses
/// from a list displayed with the roles' 1-based ordinals.
pub fn select_role(roles: &[Role]) -> Result<&Role> {
    if let [role] = roles {
        info!("Auto-selected the only available role: {}", role.role_arn);
        return Ok(role);
    }

    let items: Vec<String> = roles.iter().map(role_line).collect();
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a role")
        .items(&items)
        .default(0)
        .interact()
        .context("Failed to read role selection")?;

    Ok(&roles[index])
}

/// Pick the MFA device to challenge
///
/// A single registered device is selected automatically. A configured
/// default device type is matched case-insensitively before falling back
/// to an interactive choice.
pub fn select_mfa_device<'a>(
    devices: &'a [MfaDevice],
    default_device_type: &str,
) -> Result<&'a MfaDevice> {
    if let [device] = devices {
        info!("Auto-selected the only registered MFA device: {}", device.device_type);
        return Ok(device);
    }

    if !default_device_type.is_empty() {
        if let Some(index) = find_default_device(devices, default_device_type) {
            println!("Picked your default defined MFA device.");
            return Ok(&devices[index]);
        }
        println!("No MFA device match found for your default defined MFA device: [{default_device_type}].");
    }

    let items: Vec<&str> = devices.iter().map(|d| d.device_type.as_str()).collect();
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select an MFA device")
        .items(&items)
        .default(0)
        .interact()
        .context("Failed to read MFA device selection")?;

    Ok(&devices[index])
}

/// Ask for a one-time password for the chosen device
pub fn otp(device: &MfaDevice) -> Result<String> {
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(otp_prompt_text(&device.device_type))
        .interact_text()
        .context("Failed to read one-time password")
}

fn role_line(role: &Role) -> String {
    format!(
        "[{:2}] > {}:{:<15} :: {}",
        role.ordinal,
        role.account_id,
        role.short_name(),
        role.account_name
    )
}

fn find_default_device(devices: &[MfaDevice], default_device_type: &str) -> Option<usize> {
    devices
        .iter()
        .position(|device| device.device_type.eq_ignore_ascii_case(default_device_type))
}

fn otp_prompt_text(device_type: &str) -> String {
    if device_type.to_lowercase().contains("yubikey") {
        "Enter your YubiKey security code".to_string()
    } else {
        format!("Enter your {device_type} one-time password")
    }
}
