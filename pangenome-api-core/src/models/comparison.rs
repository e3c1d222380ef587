//! Items returned by the comparison genome searches.
//!
//! The per-genome feature lists are heterogeneous tuples whose shape the service does not
//! pin down, so each tuple is kept as a raw JSON value.
use serde_json::Value;
use std::collections::BTreeMap;

record! {
    pub struct GenomeComparisonGenome / GenomeComparisonGenomeBuilder {
        id: String = "id",
        genome_ref: String = "genome_ref",
        /// Other genome id to `(shared families, shared functions)`.
        genome_similarity: BTreeMap<String, (i64, i64)> = "genome_similarity",
        name: String = "name",
        taxonomy: String = "taxonomy",
        features: i64 = "features",
        families: i64 = "families",
        functions: i64 = "functions",
    }
}

record! {
    pub struct GenomeComparisonFamily / GenomeComparisonFamilyBuilder {
        core: i64 = "core",
        genome_features: BTreeMap<String, Vec<Value>> = "genome_features",
        id: String = "id",
        kind: String = "type",
        protein_translation: String = "protein_translation",
        number_genomes: i64 = "number_genomes",
        fraction_genomes: f64 = "fraction_genomes",
        fraction_consistent_annotations: f64 = "fraction_consistent_annotations",
        most_consistent_role: String = "most_consistent_role",
    }
}

record! {
    pub struct GenomeComparisonFunction / GenomeComparisonFunctionBuilder {
        core: i64 = "core",
        genome_features: BTreeMap<String, Vec<Value>> = "genome_features",
        id: String = "id",
        reactions: Vec<Value> = "reactions",
        subsystem: String = "subsystem",
        primclass: String = "primclass",
        subclass: String = "subclass",
        number_genomes: i64 = "number_genomes",
        fraction_genomes: f64 = "fraction_genomes",
        fraction_consistent_families: f64 = "fraction_consistent_families",
        most_consistent_family: String = "most_consistent_family",
    }
}
