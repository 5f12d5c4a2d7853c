use anyhow::{Result, anyhow};
use directories::UserDirs;
use log::info;
use serde::Deserialize;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    pub name: Option<String>,
}

/// Tunables for the classifier and synthesizer. Every field has a
/// calibrated default, so a partial profile is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Thumb-to-index distance (normalised) below which a pinch is on.
    pub pinch_close: f32,
    /// Min interval between left clicks / right clicks.
    pub click_cooldown_ms: u64,
    /// Min interval between scroll ticks.
    pub scroll_cooldown_ms: u64,
    /// Min interval between START pulses (open palm).
    pub start_cooldown_ms: u64,
    /// EWMA alpha for the cursor. Higher = more responsive, more jitter.
    pub cursor_smoothing: f32,
    /// EWMA alpha for the gamepad stick.
    pub stick_smoothing: f32,
    /// Radial dead-zone around the stick centre (normalised).
    pub stick_deadzone: f32,
    /// Consecutive identical classifications before a gesture activates.
    pub confirm_frames: u32,
    /// Thumb must be this far above/below the wrist to pick a scroll
    /// direction; inside the band the pose counts as Pointer.
    pub scroll_band: f32,
    /// Wheel delta per scroll tick.
    pub scroll_step: i32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            pinch_close: 0.050,
            click_cooldown_ms: 300,
            scroll_cooldown_ms: 120,
            start_cooldown_ms: 1000,
            cursor_smoothing: 0.40,
            stick_smoothing: 0.35,
            stick_deadzone: 0.08,
            confirm_frames: 3,
            scroll_band: 0.04,
            scroll_step: 3,
        }
    }
}

impl Thresholds {
    pub fn click_cooldown(&self) -> Duration {
        Duration::from_millis(self.click_cooldown_ms)
    }
    pub fn scroll_cooldown(&self) -> Duration {
        Duration::from_millis(self.scroll_cooldown_ms)
    }
    pub fn start_cooldown(&self) -> Duration {
        Duration::from_millis(self.start_cooldown_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Screen {
    pub width: u32,
    pub height: u32,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub meta: Meta,
    pub thresholds: Thresholds,
    pub screen: Screen,
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    pub active_name: String,
    pub profile: Profile,
    pub config_dir: PathBuf,
    pub profiles_dir: PathBuf,
    pub active_ptr: PathBuf,
}

fn config_dir() -> PathBuf {
    let home = UserDirs::new()
        .map(|u| u.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".config").join("handctl")
}

fn profiles_dir() -> PathBuf {
    config_dir().join("profiles")
}

fn active_ptr_path() -> PathBuf {
    config_dir().join("active")
}

fn default_profile_text() -> &'static str {
    include_str!("../profiles/default.toml")
}

impl ConfigStore {
    pub fn load_or_install_default() -> Result<Self> {
        let cfgdir = config_dir();
        let profdir = profiles_dir();
        fs::create_dir_all(&profdir)?;

        let def_path = profdir.join("default.toml");
        if !def_path.exists() {
            fs::write(&def_path, default_profile_text())?;
            info!("installed default profile at {}", def_path.display());
        }

        let active_ptr = active_ptr_path();
        if !active_ptr.exists() {
            let mut f = fs::File::create(&active_ptr)?;
            f.write_all(b"default")?;
        }

        let active_name = fs::read_to_string(&active_ptr)?.trim().to_string();
        let profile = Self::load_profile(&active_name)?;

        Ok(Self {
            active_name,
            profile,
            config_dir: cfgdir,
            profiles_dir: profdir,
            active_ptr,
        })
    }

    pub fn reload(&mut self) -> Result<()> {
        self.profile = Self::load_profile(&self.active_name)?;
        Ok(())
    }

    pub fn set_active(&mut self, name: &str) -> Result<()> {
        let p = self.profiles_dir.join(format!("{name}.toml"));
        if !p.exists() {
            return Err(anyhow!("profile not found: {}", p.display()));
        }
        fs::write(&self.active_ptr, name.as_bytes())?;
        self.active_name = name.to_string();
        self.reload()?;
        Ok(())
    }

    pub fn active_profile_path(&self) -> PathBuf {
        self.profiles_dir.join(format!("{}.toml", self.active_name))
    }

    pub fn list_profiles(&self) -> Vec<String> {
        let mut v = Vec::new();
        if let Ok(rd) = fs::read_dir(&self.profiles_dir) {
            for e in rd.flatten() {
                if let Some(ext) = e.path().extension() {
                    if ext == "toml" {
                        if let Some(stem) = e.path().file_stem().and_then(|s| s.to_str()) {
                            v.push(stem.to_string());
                        }
                    }
                }
            }
        }
        v.sort();
        v
    }

    fn load_profile(name: &str) -> Result<Profile> {
        let path = profiles_dir().join(format!("{name}.toml"));
        let txt = fs::read_to_string(&path)
            .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
        let profile: Profile =
            toml::from_str(&txt).map_err(|e| anyhow!("failed to parse {}: {e}", path.display()))?;
        validate_profile(&profile)?;
        Ok(profile)
    }

    pub fn doctor_report(&self) -> serde_json::Value {
        let uinput_ok = Path::new("/dev/uinput").exists();
        let in_input_group = check_in_input_group();
        serde_json::json!({
            "uinput_present": uinput_ok,
            "input_group_member": in_input_group,
            "profiles_dir": self.profiles_dir,
            "active_profile": self.active_name,
            "hints": {
                "driver": "the HID driver fed by handctl needs /dev/uinput write access",
                "udev_rule": "/etc/udev/rules.d/80-uinput.rules",
                "add_user_to_input_group": "sudo usermod -aG input $USER && newgrp input"
            }
        })
    }
}

fn validate_profile(p: &Profile) -> Result<()> {
    let t = &p.thresholds;
    if !(t.pinch_close > 0.0 && t.pinch_close < 1.0) {
        return Err(anyhow!("thresholds.pinch_close must be in (0,1)"));
    }
    if t.click_cooldown_ms == 0 || t.scroll_cooldown_ms == 0 || t.start_cooldown_ms == 0 {
        return Err(anyhow!("cooldowns must be positive durations"));
    }
    for (name, a) in [
        ("cursor_smoothing", t.cursor_smoothing),
        ("stick_smoothing", t.stick_smoothing),
    ] {
        if !(a > 0.0 && a <= 1.0) {
            return Err(anyhow!("thresholds.{name} must be in (0,1]"));
        }
    }
    if !(0.0..0.5).contains(&t.stick_deadzone) {
        return Err(anyhow!("thresholds.stick_deadzone must be in [0,0.5)"));
    }
    if t.confirm_frames == 0 {
        return Err(anyhow!("thresholds.confirm_frames must be >= 1"));
    }
    if t.scroll_band <= 0.0 {
        return Err(anyhow!("thresholds.scroll_band must be positive"));
    }
    if p.screen.width == 0 || p.screen.height == 0 {
        return Err(anyhow!("screen dimensions must be nonzero"));
    }
    Ok(())
}

fn check_in_input_group() -> bool {
    if let Ok(s) = fs::read_to_string("/etc/group") {
        let user = whoami::username();
        for line in s.lines() {
            if line.starts_with("input:") {
                if line
                    .split(':')
                    .nth(3)
                    .unwrap_or("")
                    .split(',')
                    .any(|u| u == user)
                {
                    return true;
                }
            }
        }
    }
    false
}
