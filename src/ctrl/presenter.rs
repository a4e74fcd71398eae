use crate::ctrl::CtrlOutput;
use serde::Serialize;

#[derive(Serialize)]
struct ChangefeedEntry<'a> {
    id: &'a str,
}

/// `render()` turns a command result into the single line printed for the operator: one-line JSON
/// for queries, plain text for `clear-all` and `get-logical-time`.
pub fn render(output: &CtrlOutput) -> Result<String, serde_json::Error> {
    match output {
        CtrlOutput::ChangefeedInfo(info) => serde_json::to_string(info),
        CtrlOutput::ChangefeedStatus(status) => serde_json::to_string(status),
        CtrlOutput::ChangefeedIds(ids) => {
            let entries: Vec<_> = ids.iter().map(|id| ChangefeedEntry { id }).collect();
            serde_json::to_string(&entries)
        }
        CtrlOutput::Captures(captures) => serde_json::to_string(captures),
        CtrlOutput::Processors(processors) => serde_json::to_string(processors),
        CtrlOutput::TaskStatus(status) => serde_json::to_string(status),
        CtrlOutput::Cleared { deleted } => Ok(format!("cleared {} keys", deleted)),
        CtrlOutput::LogicalTime(time) => Ok(time.compose().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctrl::CaptureEntry;
    use crate::kv::ProcessorInfo;
    use crate::model::{ChangefeedStatus, TaskStatus};
    use crate::oracle::LogicalTime;
    use serde_json::{json, Value};

    fn parse(output: &CtrlOutput) -> Value {
        let line = render(output).unwrap();
        assert!(!line.contains('\n'));
        serde_json::from_str(&line).unwrap()
    }

    #[test]
    fn changefeed_ids_are_objects() {
        let output = CtrlOutput::ChangefeedIds(vec!["a".into(), "b".into()]);
        assert_eq!(parse(&output), json!([{"id": "a"}, {"id": "b"}]));
    }

    #[test]
    fn captures_carry_is_owner() {
        let output = CtrlOutput::Captures(vec![CaptureEntry {
            id: "cap".into(),
            is_owner: true,
        }]);
        assert_eq!(parse(&output), json!([{"id": "cap", "is-owner": true}]));
    }

    #[test]
    fn processors_name_their_pair() {
        let output = CtrlOutput::Processors(vec![ProcessorInfo {
            capture_id: "cap".into(),
            changefeed_id: "cf".into(),
            status: TaskStatus::default(),
        }]);
        let value = parse(&output);
        assert_eq!(value[0]["capture-id"], "cap");
        assert_eq!(value[0]["changefeed-id"], "cf");
        assert!(value[0]["status"]["tables"].is_object());
    }

    #[test]
    fn status_shape() {
        let output = CtrlOutput::ChangefeedStatus(ChangefeedStatus {
            resolved_ts: 3,
            checkpoint_ts: 2,
            ..Default::default()
        });
        assert_eq!(
            parse(&output),
            json!({"resolved-ts": 3, "checkpoint-ts": 2, "admin-job-type": 0})
        );
    }

    #[test]
    fn unavailable_task_status_is_null() {
        assert_eq!(render(&CtrlOutput::TaskStatus(None)).unwrap(), "null");
    }

    #[test]
    fn plain_text_results() {
        assert_eq!(render(&CtrlOutput::Cleared { deleted: 4 }).unwrap(), "cleared 4 keys");
        assert_eq!(
            render(&CtrlOutput::LogicalTime(LogicalTime::new(1, 5))).unwrap(),
            ((1u64 << 18) + 5).to_string()
        );
        assert_eq!(render(&CtrlOutput::ChangefeedIds(vec![])).unwrap(), "[]");
    }
}
