use serde::Serialize;

use super::domain::ProposalStatus;
use super::gate::SubmissionBlocker;
use super::lifecycle::LifecycleAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerTone {
    Info,
    Success,
    Danger,
    Warning,
}

/// Follow-up the banner recommends, paired with the lifecycle call it triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BannerAction {
    pub label: &'static str,
    pub action: LifecycleAction,
}

/// Status feedback rendered above the swap builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposalBanner {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProposalStatus>,
    pub tone: BannerTone,
    pub title: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<BannerAction>,
    pub dismissible: bool,
}

impl ProposalBanner {
    /// Banner for a lifecycle status; drafts have none.
    pub fn for_status(status: ProposalStatus) -> Option<Self> {
        let banner = match status {
            ProposalStatus::Draft => return None,
            ProposalStatus::Pending => Self {
                status: Some(status),
                tone: BannerTone::Info,
                title: "Proposal Pending",
                message: "Your swap proposal has been sent and is awaiting a response from the other user.",
                action: None,
                dismissible: false,
            },
            ProposalStatus::Accepted => Self {
                status: Some(status),
                tone: BannerTone::Success,
                title: "Proposal Accepted!",
                message: "The other user has accepted your swap proposal. You can now proceed to finalize the details.",
                action: Some(BannerAction {
                    label: "Proceed to Chat",
                    action: LifecycleAction::Acknowledge,
                }),
                dismissible: true,
            },
            ProposalStatus::Rejected => Self {
                status: Some(status),
                tone: BannerTone::Danger,
                title: "Proposal Rejected",
                message: "The other user has declined your swap proposal. You can modify your offer and try again.",
                action: Some(BannerAction {
                    label: "Modify Proposal",
                    action: LifecycleAction::Modify,
                }),
                dismissible: true,
            },
        };
        Some(banner)
    }

    pub fn warning(blocker: SubmissionBlocker) -> Self {
        Self {
            status: None,
            tone: BannerTone::Warning,
            title: "Attention Required",
            message: blocker.message(),
            action: None,
            dismissible: true,
        }
    }
}
