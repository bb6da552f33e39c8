use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{Reader, Writer};

use crate::error::{Error, Result};
use crate::record::Record;
use crate::table::Table;

/// Reads a table from the CSV file at `path`
pub fn load_table<P>(path: &P) -> Result<Table>
where
    P: AsRef<Path> + ?Sized,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|inner| Error::AccessError {
        inner,
        path: path.to_owned(),
    })?;

    read_table(file)
}

/// Reads a headed CSV table from any reader
pub fn read_table<R: Read>(reader: R) -> Result<Table> {
    let mut reader = Reader::from_reader(reader);
    let records = reader
        .deserialize::<Record>()
        .collect::<std::result::Result<Vec<_>, _>>()?;

    info!("Read {} records", records.len());

    Table::new(records)
}

/// Writes `table` to `path` in the same format `load_table` reads
pub fn save_table<P>(table: &Table, path: &P) -> Result<()>
where
    P: AsRef<Path> + ?Sized,
{
    let path = path.as_ref();
    let file = File::create(path).map_err(|inner| Error::AccessError {
        inner,
        path: path.to_owned(),
    })?;

    write_table(table, file)
}

pub fn write_table<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut writer = Writer::from_writer(writer);
    for record in table {
        writer.serialize(record)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{read_table, write_table};
    use crate::error::Error;
    use crate::record::Column;

    const HEADER: &str = "ID,Year,Month,StateRegistrationOfBirth,NumberOfBirthCertificatesForBoys,\
NumberOfBirthCertificatesForGirls,StateRegistrationOfDeath,StateRegistrationOfMarriage,\
StateRegistrationOfDivorce,StateRegistrationOfPaternityExamination,StateRegistrationOfAdoption,\
StateRegistrationOfNameChange,TotalPopulationThisYear";

    #[test]
    fn reads_rows_and_empty_cells() {
        let csv = format!(
            "{}\n1,2010,1,9206,4783,4423,10112,3900,2662,1103,87,480,11514330\n\
             2,2010,2,9523,,4588,9772,6001,2833,1212,,614,11514330\n",
            HEADER
        );

        let table = read_table(csv.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        let second = &table.records()[1];
        assert_eq!(second.month, 2);
        assert_eq!(second.births, Some(9523));
        assert_eq!(second.boys_birth_certificates, None);
        assert_eq!(second.adoptions, None);
        assert_eq!(second.get(Column::TotalPopulation), Some(11_514_330.));
    }

    #[test]
    fn writes_what_it_reads() {
        let csv = format!(
            "{}\n1,2010,1,9206,4783,4423,10112,3900,2662,1103,87,480,11514330\n\
             2,2010,2,9523,,4588,9772,6001,2833,1212,,614,11514330\n",
            HEADER
        );
        let table = read_table(csv.as_bytes()).unwrap();

        let mut out = Vec::new();
        write_table(&table, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), csv);
    }

    #[test]
    fn malformed_cells_are_csv_errors() {
        let csv = format!(
            "{}\n1,2010,1,lots,4783,4423,10112,3900,2662,1103,87,480,11514330\n",
            HEADER
        );

        assert!(matches!(read_table(csv.as_bytes()), Err(Error::CsvError(_))));
    }

    #[test]
    fn month_thirteen_is_rejected() {
        let csv = format!(
            "{}\n7,2010,13,9206,4783,4423,10112,3900,2662,1103,87,480,11514330\n",
            HEADER
        );

        assert!(matches!(
            read_table(csv.as_bytes()),
            Err(Error::InvalidMonth { id: 7, month: 13 })
        ));
    }
}
