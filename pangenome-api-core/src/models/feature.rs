use std::collections::BTreeMap;

record! {
    /// A contiguous region on a contig.
    pub struct Location / LocationBuilder {
        contig_id: String = "contig_id",
        /// Zero-based start offset.
        start: i64 = "start",
        /// `+` or `-`.
        strand: String = "strand",
        length: i64 = "length",
    }
}

record! {
    /// A genomic feature (gene, CDS, ...) as returned by genome searches.
    pub struct FeatureData / FeatureDataBuilder {
        feature_id: String = "feature_id",
        /// Alias source to the aliases it provides.
        aliases: BTreeMap<String, Vec<String>> = "aliases",
        function: String = "function",
        location: Vec<Location> = "location",
        feature_type: String = "feature_type",
        global_location: Location = "global_location",
        feature_idx: i64 = "feature_idx",
        /// Ontology term id to term name.
        ontology_terms: BTreeMap<String, String> = "ontology_terms",
    }
}
