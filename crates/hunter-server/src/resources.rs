//! Example target resources exposed alongside the design tools.
//!
//! Each resource is a small piece of reference input a remote caller can
//! feed straight into a design tool: protein sequences, a ligand CCD
//! code, a SMILES string, and a nucleic acid sequence.

use serde_json::{json, Value};

/// PD-L1 ectodomain, the stock protein-protein design target.
pub const EXAMPLE_PDL1_SEQUENCE: &str = "AFTVTVPKDLYVVEYGSNMTIECKFPVEKQLDLAALIVYWEMEDKNIIQFVHGEEDLKVQHSSYRQRARLLKDQLSLGNAALQITDVKLQDAGVYRCMISYGGADYKRITVKVNAPYAAALE";

/// Truncated PD-L1 variant used with template-guided design.
pub const EXAMPLE_PDL1_SHORT_SEQUENCE: &str =
    "AFTVTVPKDLYVVEYGSNMTIECKFPVEKQLDLAALIVYWEMEDKNIIQFVHGEEDLKVQHSSYRQRARLLKDQLSLGNAALQITDVKLQDAGVYRCMISY";

/// Homodimeric target, chains separated by ':'.
pub const EXAMPLE_MULTIMER_SEQUENCE: &str =
    "AFTVTVPKDLYVVEYGSNMTIECKFPVEKQLDLAALIVYWEMEDKNIIQFVHGEEDLKVQHSSYRQRARLLKDQLSLGNAALQITDVKLQDAGVYRCMISY:AFTVTVPKDLYVVEYGSNMTIECKFPVEKQLDLAALIVYWEMEDKNIIQFVHGEEDLKVQHSSYRQRARLLKDQLSLGNAALQITDVKLQDAGVYRCMISY";

/// Short RNA target.
pub const EXAMPLE_RNA_SEQUENCE: &str = "AGAGAGAGA";

/// Longer RNA target.
pub const EXAMPLE_RNA_LONG_SEQUENCE: &str = "AGAGAGAGAGAGAGAGAGAGA";

/// S-adenosylmethionine, by Chemical Component Dictionary code.
pub const EXAMPLE_LIGAND_SAM: &str = "SAM";

/// Kinase-inhibitor-like ligand as a SMILES string.
pub const EXAMPLE_LIGAND_SMILES: &str = "O=C(NCc1cocn1)c1cnn(C)c1C(=O)Nc1ccn2cc(nc2n1)c1ccccc1";

/// All twenty amino acids; the target alphabet for unconditional design.
pub const EXAMPLE_GENERIC_TARGET: &str = "ACDEFGHIKLMNPQRSTVWY";

/// A named read-only resource.
pub struct Resource {
    pub uri: &'static str,
    pub description: &'static str,
    pub content: &'static str,
}

/// The full resource table, in registration order.
pub const RESOURCES: &[Resource] = &[
    Resource {
        uri: "protein://example1/pdl1",
        description: "PD-L1 sequence for protein-protein design with an all-X binder.",
        content: EXAMPLE_PDL1_SEQUENCE,
    },
    Resource {
        uri: "protein://example2/pdl1_short",
        description: "Shorter PD-L1 variant for template-guided design.",
        content: EXAMPLE_PDL1_SHORT_SEQUENCE,
    },
    Resource {
        uri: "protein://example3/pdl1_contact",
        description: "PD-L1 sequence for contact-constrained design.",
        content: EXAMPLE_PDL1_SEQUENCE,
    },
    Resource {
        uri: "protein://example4/multimer",
        description: "Homodimer sequence pair for multimer binder design.",
        content: EXAMPLE_MULTIMER_SEQUENCE,
    },
    Resource {
        uri: "protein://example5/pdl1_ligand",
        description: "PD-L1 sequence for small-molecule binder design.",
        content: EXAMPLE_PDL1_SEQUENCE,
    },
    Resource {
        uri: "ligand://example5/sam",
        description: "SAM ligand CCD code for small-molecule binder design.",
        content: EXAMPLE_LIGAND_SAM,
    },
    Resource {
        uri: "nucleic://example6/rna",
        description: "RNA sequence for nucleic acid binder design.",
        content: EXAMPLE_RNA_SEQUENCE,
    },
    Resource {
        uri: "nucleic://example6/rna_long",
        description: "Longer RNA sequence for nucleic acid binder design.",
        content: EXAMPLE_RNA_LONG_SEQUENCE,
    },
    Resource {
        uri: "protein://example7/pdl1_multiple",
        description: "PD-L1 sequence for heterogeneous target design.",
        content: EXAMPLE_PDL1_SEQUENCE,
    },
    Resource {
        uri: "ligand://chai/smiles",
        description: "SMILES string for Chai ligand binder design.",
        content: EXAMPLE_LIGAND_SMILES,
    },
    Resource {
        uri: "protein://chai/generic_target",
        description: "Generic 20-residue target for unconditional design.",
        content: EXAMPLE_GENERIC_TARGET,
    },
];

/// Look a resource up by URI.
pub fn find(uri: &str) -> Option<&'static Resource> {
    RESOURCES.iter().find(|resource| resource.uri == uri)
}

/// URI + description listing for remote callers.
pub fn manifest() -> Value {
    let resources: Vec<Value> = RESOURCES
        .iter()
        .map(|resource| {
            json!({
                "uri": resource.uri,
                "description": resource.description,
            })
        })
        .collect();
    json!({ "resources": resources })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_known_uri() {
        let resource = find("ligand://example5/sam").unwrap();
        assert_eq!(resource.content, "SAM");
        assert!(find("protein://nope").is_none());
    }

    #[test]
    fn test_uris_are_unique() {
        for (i, resource) in RESOURCES.iter().enumerate() {
            assert!(
                !RESOURCES[i + 1..].iter().any(|other| other.uri == resource.uri),
                "duplicate uri {}",
                resource.uri
            );
        }
    }

    #[test]
    fn test_manifest_lists_every_resource() {
        let manifest = manifest();
        assert_eq!(
            manifest["resources"].as_array().unwrap().len(),
            RESOURCES.len()
        );
    }
}
