use crate::workflows::deprovision::domain::TargetIdentitySet;
use std::io::Read;

/// Reads identifiers from the first column, treating row 1 as a header.
pub(crate) fn parse_identities<R: Read>(reader: R) -> Result<ParsedImport, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut identities = TargetIdentitySet::new();
    let mut rows = 0usize;
    let mut skipped = 0usize;

    for record in csv_reader.records() {
        let record = record?;
        rows += 1;

        match record.get(0) {
            Some(value) if identities.insert(value) => {}
            _ => skipped += 1,
        }
    }

    Ok(ParsedImport {
        identities,
        rows,
        skipped,
    })
}

#[derive(Debug)]
pub(crate) struct ParsedImport {
    pub(crate) identities: TargetIdentitySet,
    pub(crate) rows: usize,
    pub(crate) skipped: usize,
}
