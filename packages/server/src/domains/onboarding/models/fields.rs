use serde::{Deserialize, Serialize};

/// Stage 1 - what the customer needs done
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobFields {
    pub service: String,
    pub postal_code: String,
    pub city: String,
    pub description: String,
    pub start_time: String,
    pub budget: String,
    /// Uploaded files are held in memory only and never written to a draft
    #[serde(skip)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// What the client sees of an attachment; the bytes stay server-side
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentSummary {
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

impl From<&Attachment> for AttachmentSummary {
    fn from(attachment: &Attachment) -> Self {
        Self {
            file_name: attachment.file_name.clone(),
            content_type: attachment.content_type.clone(),
            size: attachment.bytes.len(),
        }
    }
}

/// Stage 2 - how to reach the customer. Secrets are not part of this struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactFields {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

/// Partial update of job fields; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFieldsPatch {
    pub service: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub budget: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactFieldsPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

fn apply(target: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl JobFields {
    pub fn apply(&mut self, patch: JobFieldsPatch) {
        apply(&mut self.service, patch.service);
        apply(&mut self.postal_code, patch.postal_code);
        apply(&mut self.city, patch.city);
        apply(&mut self.description, patch.description);
        apply(&mut self.start_time, patch.start_time);
        apply(&mut self.budget, patch.budget);
    }
}

impl ContactFields {
    pub fn apply(&mut self, patch: ContactFieldsPatch) {
        apply(&mut self.full_name, patch.full_name);
        apply(&mut self.email, patch.email);
        apply(&mut self.phone, patch.phone);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_only_touches_provided_fields() {
        let mut job = JobFields {
            service: "Plumbing".into(),
            city: "Oslo".into(),
            ..Default::default()
        };
        job.apply(JobFieldsPatch {
            city: Some("Bergen".into()),
            ..Default::default()
        });
        assert_eq!(job.service, "Plumbing");
        assert_eq!(job.city, "Bergen");
    }

    #[test]
    fn attachments_are_not_serialized() {
        let job = JobFields {
            service: "Roofing".into(),
            attachments: vec![Attachment {
                file_name: "roof.jpg".into(),
                content_type: "image/jpeg".into(),
                bytes: vec![1, 2, 3],
            }],
            ..Default::default()
        };
        let json = serde_json::to_value(&job).unwrap();
        assert!(json.get("attachments").is_none());
        assert_eq!(json["service"], "Roofing");
        assert!(json.get("postalCode").is_some());
    }
}
