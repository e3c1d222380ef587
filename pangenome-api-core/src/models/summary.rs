use std::collections::BTreeMap;

record! {
    pub struct ComputeSummaryFromPG / ComputeSummaryFromPGBuilder {
        pangenome_ref: String = "pangenome_ref",
    }
}

record! {
    /// Family and gene counts for a whole pangenome.
    pub struct ComputeSummaryFromPGResult / ComputeSummaryFromPGResultBuilder {
        /// Family category (e.g. `homolog_families_count`) to count.
        families: BTreeMap<String, i64> = "families",
        /// Gene category (e.g. `singleton_family_genes_count`) to count.
        genes: BTreeMap<String, i64> = "genes",
        /// Genome name to the number of families it shares with every other genome.
        shared_family_map: BTreeMap<String, BTreeMap<String, i64>> = "shared_family_map",
        genome_ref_name_map: BTreeMap<String, BTreeMap<String, String>> = "genome_ref_name_map",
        pangenome_id: String = "pangenome_id",
        genomes: i64 = "genomes",
    }
}
