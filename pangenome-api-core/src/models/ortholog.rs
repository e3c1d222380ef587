/// One member of an ortholog family: `(feature id, score, genome ref)`.
pub type OrthologMember = (String, f64, String);

record! {
    /// All data held for a single ortholog family in a pangenome.
    pub struct OrthologsData / OrthologsDataBuilder {
        id: String = "id",
        /// The family type (serialized as `type`).
        kind: String = "type",
        function: String = "function",
        md5: String = "md5",
        protein_translation: String = "protein_translation",
        orthologs: Vec<OrthologMember> = "orthologs",
    }
}
