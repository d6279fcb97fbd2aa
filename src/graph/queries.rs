//! Cypher statements issued against the ownership graph

/// Hybrid retrieval: nearest-neighbor search over the document vector
/// index, joined out to the owning company and manager where those paths
/// exist. `aggregate_fn` folds the scores of multiple paths reaching the
/// same document ("avg" or "max").
pub fn vector_graph_search(aggregate_fn: &str) -> String {
    format!(
        "CALL db.index.vector.queryNodes($indexName, $k, $queryVector) \
         YIELD node AS doc, score \
         OPTIONAL MATCH (doc)<-[:HAS]-(company:Company), (company)<-[:OWNS]-(manager:Manager) \
         RETURN company.nameOfIssuer AS companyName, doc.text AS text, \
                manager.name AS asset_manager, {agg}(score) AS score \
         ORDER BY score DESC LIMIT $k",
        agg = aggregate_fn
    )
}

/// Number of managers in the graph
pub const MANAGER_COUNT: &str = "MATCH (m:Manager) RETURN count(m) AS managers";

/// Number of companies in the graph
pub const COMPANY_COUNT: &str = "MATCH (c:Company) RETURN count(c) AS companies";

/// Total reported asset value across all ownership relationships, in billions
pub const TOTAL_ASSET_VALUE: &str =
    "MATCH (m:Manager)-[o:OWNS]->(c:Company) \
     RETURN sum(o.value) / 1000000000.0 AS assetsInBillions";

/// Largest manager-to-company holdings by total reported value
pub const TOP_HOLDINGS: &str =
    "MATCH (m:Manager)-[o:OWNS]->(c:Company) \
     RETURN m.name AS manager, c.nameOfIssuer AS company, \
            sum(o.value) / 1000000000.0 AS valueInBillions \
     ORDER BY valueInBillions DESC LIMIT $limit";
