//! Response-document assembly.
//!
//! Only a run that completed without abort reaches this stage: the builder
//! reconstructs the input's group/case nesting from the flat ordered
//! results, carrying the identifiers through unchanged. Group-level
//! configuration such as the engine identifier is not echoed.

use serde::Serialize;

use crate::dispatch::CaseResult;

/// Output document mirroring the vector set's shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseDocument {
    /// Algorithm name carried through from the input document.
    pub algorithm: String,
    /// Groups in input order.
    #[serde(rename = "testGroups")]
    pub groups: Vec<ResponseGroup>,
}

/// One group of the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseGroup {
    /// Group identifier carried through from the input.
    #[serde(rename = "tgId")]
    pub group_id: u64,
    /// Cases in input order.
    #[serde(rename = "tests")]
    pub cases: Vec<ResponseCase>,
}

/// One case of the response; case content is replaced by derived output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseCase {
    /// Case identifier carried through from the input.
    #[serde(rename = "tcId")]
    pub case_id: u64,
    /// Backend-derived key, hex encoded.
    #[serde(rename = "sharedKey")]
    pub shared_key: String,
}

impl ResponseDocument {
    /// Regroups the flat ordered results by group identifier.
    ///
    /// Results arrive in flattened input order, so adjacent grouping
    /// reconstructs the original nesting; exactly one response case exists
    /// per accepted input case.
    #[must_use]
    pub fn assemble(algorithm: String, results: Vec<CaseResult>) -> Self {
        let mut groups: Vec<ResponseGroup> = Vec::new();
        for result in results {
            let case = ResponseCase {
                case_id: result.case_id,
                shared_key: hex::encode_upper(result.output),
            };
            let start_new_group =
                groups.last().map_or(true, |group| group.group_id != result.group_id);
            if start_new_group {
                groups.push(ResponseGroup { group_id: result.group_id, cases: Vec::new() });
            }
            if let Some(group) = groups.last_mut() {
                group.cases.push(case);
            }
        }
        Self { algorithm, groups }
    }

    /// Total number of response cases across all groups.
    #[must_use]
    pub fn case_count(&self) -> usize {
        self.groups.iter().map(|group| group.cases.len()).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn result(group_id: u64, case_id: u64, byte: u8) -> CaseResult {
        CaseResult { group_id, case_id, output: vec![byte; 4] }
    }

    #[test]
    fn assemble_reconstructs_group_nesting() {
        let results =
            vec![result(1, 1, 0xAA), result(1, 2, 0xBB), result(7, 3, 0xCC)];
        let response = ResponseDocument::assemble("kdf135-snmp".to_owned(), results);

        assert_eq!(response.groups.len(), 2);
        assert_eq!(response.groups[0].group_id, 1);
        assert_eq!(response.groups[0].cases.len(), 2);
        assert_eq!(response.groups[1].group_id, 7);
        assert_eq!(response.groups[1].cases[0].case_id, 3);
        assert_eq!(response.groups[1].cases[0].shared_key, "CCCCCCCC");
        assert_eq!(response.case_count(), 3);
    }

    #[test]
    fn serializes_with_acvp_field_names() {
        let response =
            ResponseDocument::assemble("kdf135-snmp".to_owned(), vec![result(1, 1, 0x0F)]);
        let json = serde_json::to_value(&response).expect("serializable");
        assert_eq!(json["testGroups"][0]["tgId"], 1);
        assert_eq!(json["testGroups"][0]["tests"][0]["tcId"], 1);
        assert_eq!(json["testGroups"][0]["tests"][0]["sharedKey"], "0F0F0F0F");
    }

    #[test]
    fn empty_results_yield_no_groups() {
        let response = ResponseDocument::assemble("kdf135-snmp".to_owned(), Vec::new());
        assert!(response.groups.is_empty());
        assert_eq!(response.case_count(), 0);
    }
}
