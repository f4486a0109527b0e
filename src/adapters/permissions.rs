//! Fixed permission answers. Implements PermissionPort for front-ends without a
//! permission dialog (console) and for tests.

use crate::ports::PermissionPort;

pub struct StaticPermissions {
    foreground: bool,
    background: bool,
}

impl StaticPermissions {
    pub fn new(foreground: bool, background: bool) -> Self {
        Self {
            foreground,
            background,
        }
    }

    pub fn granted() -> Self {
        Self::new(true, true)
    }
}

impl PermissionPort for StaticPermissions {
    fn has_foreground_location(&self) -> bool {
        self.foreground
    }

    fn has_background_location(&self) -> bool {
        self.background
    }
}
