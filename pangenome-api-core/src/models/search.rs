//! Query and result records for the five search operations.
//!
//! Every query carries the reference of the object to search, a free-text query, sort
//! keys and the `start`/`limit` pagination window. `num_found` may be echoed back from a
//! previous page so the server can skip recounting; only set it to a value the server
//! returned.
use super::{
    ColumnSorting, FeatureData, GenomeComparisonFamily, GenomeComparisonFunction,
    GenomeComparisonGenome, OrthologsData,
};

record! {
    pub struct SearchOrthologsFromPG / SearchOrthologsFromPGBuilder {
        pangenome_ref: String = "pangenome_ref",
        query: String = "query",
        sort_by: Vec<ColumnSorting> = "sort_by",
        start: i64 = "start",
        limit: i64 = "limit",
        num_found: i64 = "num_found",
    }
}

record! {
    /// `num_found` is the number of all matching orthologs, of which only a page is returned.
    pub struct SearchOrthologsFromPGResult / SearchOrthologsFromPGResultBuilder {
        query: String = "query",
        start: i64 = "start",
        orthologs: Vec<OrthologsData> = "orthologs",
        num_found: i64 = "num_found",
    }
}

record! {
    pub struct SearchGenomesFromPG / SearchGenomesFromPGBuilder {
        pangenome_ref: String = "pangenome_ref",
        genome_ref: String = "genome_ref",
        query: String = "query",
        sort_by: Vec<ColumnSorting> = "sort_by",
        start: i64 = "start",
        limit: i64 = "limit",
        num_found: i64 = "num_found",
    }
}

record! {
    pub struct SearchGenomesFromPGResult / SearchGenomesFromPGResultBuilder {
        query: String = "query",
        start: i64 = "start",
        features: Vec<FeatureData> = "features",
        num_found: i64 = "num_found",
    }
}

record! {
    pub struct SearchFamiliesFromCG / SearchFamiliesFromCGBuilder {
        comparison_genome_ref: String = "comparison_genome_ref",
        query: String = "query",
        sort_by: Vec<ColumnSorting> = "sort_by",
        start: i64 = "start",
        limit: i64 = "limit",
        num_found: i64 = "num_found",
    }
}

record! {
    pub struct SearchFamiliesFromCGResult / SearchFamiliesFromCGResultBuilder {
        query: String = "query",
        start: i64 = "start",
        families: Vec<GenomeComparisonFamily> = "families",
        num_found: i64 = "num_found",
    }
}

record! {
    pub struct SearchFunctionsFromCG / SearchFunctionsFromCGBuilder {
        comparison_genome_ref: String = "comparison_genome_ref",
        query: String = "query",
        sort_by: Vec<ColumnSorting> = "sort_by",
        start: i64 = "start",
        limit: i64 = "limit",
        num_found: i64 = "num_found",
    }
}

record! {
    pub struct SearchFunctionsFromCGResult / SearchFunctionsFromCGResultBuilder {
        query: String = "query",
        start: i64 = "start",
        functions: Vec<GenomeComparisonFunction> = "functions",
        num_found: i64 = "num_found",
    }
}

record! {
    pub struct SearchComparisonGenomesFromCG / SearchComparisonGenomesFromCGBuilder {
        comparison_genome_ref: String = "comparison_genome_ref",
        query: String = "query",
        sort_by: Vec<ColumnSorting> = "sort_by",
        start: i64 = "start",
        limit: i64 = "limit",
        num_found: i64 = "num_found",
    }
}

record! {
    pub struct SearchComparisonGenomesFromCGResult / SearchComparisonGenomesFromCGResultBuilder {
        query: String = "query",
        start: i64 = "start",
        comparison_genomes: Vec<GenomeComparisonGenome> = "comparison_genomes",
        num_found: i64 = "num_found",
    }
}

paginated!(SearchOrthologsFromPGResult, orthologs);
paginated!(SearchGenomesFromPGResult, features);
paginated!(SearchFamiliesFromCGResult, families);
paginated!(SearchFunctionsFromCGResult, functions);
paginated!(SearchComparisonGenomesFromCGResult, comparison_genomes);
