//! Two-click download gate: the first click shows the promotion, the second
//! one downloads.

/// What an activation of the download control should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateAction {
    /// Show the promotional overlay, don't download
    ShowPromo,
    /// Perform the download
    Download,
}

/// Per-card gate state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DownloadGate {
    /// Promotion not shown yet
    #[default]
    Locked,
    /// Promotion shown, next click downloads
    Armed,
}

impl DownloadGate {
    /// Advances the gate and returns what the click should do.
    pub fn activate(&mut self) -> GateAction {
        match self {
            DownloadGate::Locked => {
                *self = DownloadGate::Armed;
                GateAction::ShowPromo
            }
            DownloadGate::Armed => {
                *self = DownloadGate::Locked;
                GateAction::Download
            }
        }
    }

    /// Label of the download control in this state.
    pub fn label(&self) -> &'static str {
        match self {
            DownloadGate::Locked => "Download",
            DownloadGate::Armed => "Download Now",
        }
    }

    /// True once the promotion has been shown.
    pub fn is_armed(&self) -> bool {
        matches!(self, DownloadGate::Armed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternates_between_promo_and_download() {
        let mut gate = DownloadGate::default();
        assert_eq!(gate.label(), "Download");

        for _ in 0..3 {
            assert_eq!(gate.activate(), GateAction::ShowPromo);
            assert!(gate.is_armed());
            assert_eq!(gate.label(), "Download Now");

            assert_eq!(gate.activate(), GateAction::Download);
            assert!(!gate.is_armed());
            assert_eq!(gate.label(), "Download");
        }
    }
}
