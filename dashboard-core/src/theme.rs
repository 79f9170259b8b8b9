use std::{fmt, sync::Arc};

use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Colors for one theme branch. Gradients are (start, end).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: (Rgb, Rgb),
    pub card: (Rgb, Rgb),
    pub text: Rgb,
    pub toast_background: Rgb,
}

pub const LIGHT: Palette = Palette {
    background: (Rgb(0xFF, 0x6D, 0x00), Rgb(0xFF, 0xA0, 0x00)),
    card: (Rgb(0xFF, 0x8D, 0x00), Rgb(0xFF, 0xA1, 0x00)),
    text: Rgb(0x33, 0x33, 0x33),
    toast_background: Rgb(0xFF, 0xFF, 0xFF),
};

pub const DARK: Palette = Palette {
    background: (Rgb(0x26, 0x32, 0x38), Rgb(0x37, 0x47, 0x4F)),
    card: (Rgb(0x26, 0x32, 0x38), Rgb(0x37, 0x47, 0x4F)),
    text: Rgb(0xFF, 0xFF, 0xFF),
    toast_background: Rgb(0x33, 0x33, 0x33),
};

impl Palette {
    pub fn for_mode(is_dark_mode: bool) -> Self {
        if is_dark_mode { DARK } else { LIGHT }
    }
}

/// Session-wide dark mode flag.
///
/// Cloning yields another handle to the same flag. Nothing is persisted.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    flag: Arc<watch::Sender<bool>>,
}

impl Default for ThemeStore {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ThemeStore {
    pub fn new(is_dark_mode: bool) -> Self {
        let (flag, _) = watch::channel(is_dark_mode);
        Self { flag: Arc::new(flag) }
    }

    pub fn get(&self) -> bool {
        *self.flag.borrow()
    }

    /// Flip the flag and return the new value.
    pub fn toggle(&self) -> bool {
        let mut now = false;
        self.flag.send_modify(|dark| {
            *dark = !*dark;
            now = *dark;
        });
        debug!(dark_mode = now, "theme toggled");
        now
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.flag.subscribe()
    }

    pub fn palette(&self) -> Palette {
        Palette::for_mode(self.get())
    }
}
