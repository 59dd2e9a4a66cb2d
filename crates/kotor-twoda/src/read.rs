use crate::{Error, Result, Row, TwoDA};
use byteorder::{ReadBytesExt, LE};
use kotor_support::decode_str;
use std::io::{self, BufRead, BufReader, Read};

pub(crate) const SIGNATURE: &[u8; 9] = b"2DA V2.b\n";

/// Read bytes up to (not including) `delimiter`, consuming the delimiter.
///
/// Reaching the end of the input before the delimiter is an error.
fn read_until(input: &mut impl BufRead, delimiter: u8) -> Result<Vec<u8>> {
    let mut bytes = vec![];
    input.read_until(delimiter, &mut bytes)?;
    if bytes.pop() != Some(delimiter) {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }
    Ok(bytes)
}

pub(crate) fn read_twoda(input: impl Read) -> Result<TwoDA> {
    let mut input = BufReader::new(input);

    let mut signature = [0; 9];
    input.read_exact(&mut signature)?;
    if &signature != SIGNATURE {
        return Err(Error::InvalidSignature(
            String::from_utf8_lossy(&signature).into_owned(),
        ));
    }

    let header_bytes = read_until(&mut input, 0)?;
    let headers = header_bytes
        .split(|&b| b == b'\t')
        .filter(|h| !h.is_empty())
        .map(decode_str)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let row_count = input.read_u32::<LE>()? as usize;
    let labels = (0..row_count)
        .map(|_| read_until(&mut input, b'\t').and_then(|l| Ok(decode_str(&l)?)))
        .collect::<Result<Vec<_>>>()?;

    let offsets = (0..labels.len().saturating_mul(headers.len()))
        .map(|_| input.read_u16::<LE>())
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let data_size = input.read_u16::<LE>()? as usize;
    let mut data = vec![0; data_size];
    input.read_exact(&mut data)?;

    let cell_at = |offset: u16| -> Result<String> {
        let start = offset as usize;
        let rest = data.get(start..).ok_or(Error::CellOffset(offset))?;
        let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
        Ok(decode_str(&rest[..end])?)
    };

    let mut rows = Vec::with_capacity(labels.len());
    for (index, label) in labels.into_iter().enumerate() {
        let row_offsets = &offsets[index * headers.len()..(index + 1) * headers.len()];
        let cells = row_offsets
            .iter()
            .map(|&offset| cell_at(offset))
            .collect::<Result<Vec<_>>>()?;
        rows.push(Row { label, cells });
    }

    log::trace!("read 2DA with {} columns and {} rows", headers.len(), rows.len());
    Ok(TwoDA { headers, rows })
}
