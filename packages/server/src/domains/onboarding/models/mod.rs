mod fields;

pub use fields::{
    Attachment, AttachmentSummary, ContactFields, ContactFieldsPatch, JobFields, JobFieldsPatch,
};
