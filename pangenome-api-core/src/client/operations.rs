//! The remote operations exposed by the PanGenomeAPI service.
//!
//! Each method packs its single parameter record and delegates to the dispatcher. Search
//! results are additionally checked against the pagination contract.
use super::PanGenomeClient;
use crate::{
    jsonrpc::client::{CallError, ProtocolError},
    models::{
        ComputeSummaryFromPG, ComputeSummaryFromPGResult, Paginated, RpcContext,
        SearchComparisonGenomesFromCG, SearchComparisonGenomesFromCGResult, SearchFamiliesFromCG,
        SearchFamiliesFromCGResult, SearchFunctionsFromCG, SearchFunctionsFromCGResult,
        SearchGenomesFromPG, SearchGenomesFromPGResult, SearchOrthologsFromPG,
        SearchOrthologsFromPGResult,
    },
    transport::Transport,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// Fully qualified method names, in `<Service>.<operation>` form.
pub mod methods {
    pub const SEARCH_ORTHOLOGS_FROM_PANGENOME: &str =
        "PanGenomeAPI.search_orthologs_from_pangenome";
    pub const SEARCH_GENOMES_FROM_PANGENOME: &str = "PanGenomeAPI.search_genomes_from_pangenome";
    pub const SEARCH_FAMILIES_FROM_COMPARISON_GENOME: &str =
        "PanGenomeAPI.search_families_from_comparison_genome";
    pub const SEARCH_FUNCTIONS_FROM_COMPARISON_GENOME: &str =
        "PanGenomeAPI.search_functions_from_comparison_genome";
    pub const SEARCH_COMPARISON_GENOME_FROM_COMPARISON_GENOME: &str =
        "PanGenomeAPI.search_comparison_genome_from_comparison_genome";
    pub const COMPUTE_SUMMARY_FROM_PANGENOME: &str = "PanGenomeAPI.compute_summary_from_pangenome";
    pub const STATUS: &str = "PanGenomeAPI.status";
}

impl<T: Transport> PanGenomeClient<T> {
    pub async fn search_orthologs_from_pangenome(
        &self,
        params: &SearchOrthologsFromPG,
        context: Option<RpcContext>,
    ) -> Result<SearchOrthologsFromPGResult, CallError> {
        self.search(
            methods::SEARCH_ORTHOLOGS_FROM_PANGENOME,
            params,
            params.limit().copied(),
            context,
        )
        .await
    }

    pub async fn search_genomes_from_pangenome(
        &self,
        params: &SearchGenomesFromPG,
        context: Option<RpcContext>,
    ) -> Result<SearchGenomesFromPGResult, CallError> {
        self.search(
            methods::SEARCH_GENOMES_FROM_PANGENOME,
            params,
            params.limit().copied(),
            context,
        )
        .await
    }

    pub async fn search_families_from_comparison_genome(
        &self,
        params: &SearchFamiliesFromCG,
        context: Option<RpcContext>,
    ) -> Result<SearchFamiliesFromCGResult, CallError> {
        self.search(
            methods::SEARCH_FAMILIES_FROM_COMPARISON_GENOME,
            params,
            params.limit().copied(),
            context,
        )
        .await
    }

    pub async fn search_functions_from_comparison_genome(
        &self,
        params: &SearchFunctionsFromCG,
        context: Option<RpcContext>,
    ) -> Result<SearchFunctionsFromCGResult, CallError> {
        self.search(
            methods::SEARCH_FUNCTIONS_FROM_COMPARISON_GENOME,
            params,
            params.limit().copied(),
            context,
        )
        .await
    }

    pub async fn search_comparison_genome_from_comparison_genome(
        &self,
        params: &SearchComparisonGenomesFromCG,
        context: Option<RpcContext>,
    ) -> Result<SearchComparisonGenomesFromCGResult, CallError> {
        self.search(
            methods::SEARCH_COMPARISON_GENOME_FROM_COMPARISON_GENOME,
            params,
            params.limit().copied(),
            context,
        )
        .await
    }

    /// Family, gene and shared-family counts for a whole pangenome.
    pub async fn compute_summary_from_pangenome(
        &self,
        params: &ComputeSummaryFromPG,
        context: Option<RpcContext>,
    ) -> Result<ComputeSummaryFromPGResult, CallError> {
        self.rpc
            .call(methods::COMPUTE_SUMMARY_FROM_PANGENOME, params, context)
            .await
    }

    /// Liveness and version check. The result has no declared schema.
    pub async fn status(&self, context: Option<RpcContext>) -> Result<Map<String, Value>, CallError> {
        self.rpc.call_without_params(methods::STATUS, context).await
    }

    async fn search<P, R>(
        &self,
        method: &str,
        params: &P,
        limit: Option<i64>,
        context: Option<RpcContext>,
    ) -> Result<R, CallError>
    where
        P: Serialize,
        R: DeserializeOwned + Paginated,
    {
        let page: R = self.rpc.call(method, params, context).await?;
        page.check_pagination(limit).map_err(ProtocolError::from)?;
        Ok(page)
    }
}
