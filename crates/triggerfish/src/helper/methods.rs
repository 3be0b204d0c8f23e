use std::{collections::HashMap, path::Path};

use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::helper::HelperProcess;

/// A graph node reported by the helper's `find_symbol` and `neighbors` methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct HelperNode {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Type")]
    pub node_type: String,
    pub name: String,
    pub file_path: String,
    pub line: i64,
    pub column: i64,
    pub metadata: Option<HashMap<String, String>>,
}

impl HelperProcess {
    /// Push one file's content to the helper. `true` when it acknowledged indexing.
    pub async fn index_file(
        &self,
        path: &Path,
        content: &str,
    ) -> bool {
        let params = json!({
            "path": path.to_string_lossy(),
            "content": content,
        });
        let Some(result) = self.request("index_file", &params).await else {
            return false;
        };
        let indexed = result.get("indexed").and_then(Value::as_bool).unwrap_or(false);
        debug!("helper index_file {} -> indexed={indexed}", path.display());
        indexed
    }

    pub async fn find_symbol(
        &self,
        query: &str,
    ) -> Option<Vec<HelperNode>> {
        let result = self.request("find_symbol", &json!({ "query": query })).await?;
        decode_nodes(result)
    }

    pub async fn neighbors(
        &self,
        node_id: &str,
    ) -> Option<Vec<HelperNode>> {
        let result = self.request("neighbors", &json!({ "node_id": node_id })).await?;
        decode_nodes(result)
    }
}

/// `{"nodes": [...]}` into typed nodes. A `null` node list is empty.
pub(crate) fn decode_nodes(mut result: Map<String, Value>) -> Option<Vec<HelperNode>> {
    match result.remove("nodes") {
        None | Some(Value::Null) => Some(Vec::new()),
        Some(nodes) => serde_json::from_value(nodes).map_err(|err| debug!("undecodable helper nodes: {err}")).ok(),
    }
}

#[cfg(test)]
#[path = "../../tests/src/helper/methods_tests.rs"]
mod tests;
