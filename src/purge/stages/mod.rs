mod boards;
mod channels;
mod playbooks;
mod residue;
mod users;

pub use boards::{DanglingBoardMembersStage, EmptyBoardsStage};
pub use channels::EmptyChannelsStage;
pub use playbooks::{
    DanglingChannelActionsStage, DanglingPlaybookMembersStage, EmptyPlaybooksStage, EmptyRunsStage,
};
pub use residue::UserResidueStage;
pub use users::DeleteUsersStage;
