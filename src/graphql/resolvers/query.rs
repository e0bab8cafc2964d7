use crate::graphql::schema::GraphQLContext;
use crate::graphql::types::{Coverage, SnapshotStatus};
use crate::pipeline::search::{self, SearchQuery};
use crate::pipeline::storage::SnapshotInfo;
use async_graphql::{Context, FieldResult, Object};
use std::collections::BTreeSet;

/// Root query object for GraphQL
pub struct Query;

#[Object]
impl Query {
    /// Coverage records of the current snapshot, optionally filtered by exact
    /// state and/or coverage label
    async fn coverages(
        &self,
        ctx: &Context<'_>,
        state: Option<String>,
        coverage: Option<String>,
    ) -> FieldResult<Vec<Coverage>> {
        let context = ctx.data::<GraphQLContext>()?;
        let snapshot = context.storage.current().await;
        let query = SearchQuery { state, coverage };

        Ok(search::filter(&snapshot.records, &query)
            .cloned()
            .map(Coverage::from)
            .collect())
    }

    /// Distinct carrier names, sorted, optionally limited to one state
    async fn carriers(&self, ctx: &Context<'_>, state: Option<String>) -> FieldResult<Vec<String>> {
        let context = ctx.data::<GraphQLContext>()?;
        let snapshot = context.storage.current().await;
        let query = SearchQuery {
            state,
            coverage: None,
        };

        let names: BTreeSet<&str> = search::filter(&snapshot.records, &query)
            .map(|record| record.carrier.as_str())
            .collect();
        Ok(names.into_iter().map(str::to_string).collect())
    }

    /// Metadata of the snapshot being served
    async fn snapshot(&self, ctx: &Context<'_>) -> FieldResult<SnapshotStatus> {
        let context = ctx.data::<GraphQLContext>()?;
        let snapshot = context.storage.current().await;
        Ok(SnapshotInfo::from(snapshot.as_ref()).into())
    }
}
