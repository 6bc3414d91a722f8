use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// The line was consumed but was not valid UTF-8.
    Invalid,
    Eof,
}

pub async fn read_input<R>(reader: &mut R) -> std::io::Result<Input>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
        return Ok(Input::Eof);
    }

    Ok(match String::from_utf8(buf) {
        Ok(line) => Input::Line(line),
        Err(_) => Input::Invalid,
    })
}

#[cfg(test)]
mod tests {
    use super::{Input, read_input};

    #[tokio::test]
    async fn bad_bytes_skip_one_line_only() {
        let mut reader: &[u8] = b"sell\n\xff\xfe\nq";

        assert_eq!(read_input(&mut reader).await.unwrap(), Input::Line("sell\n".to_owned()));
        assert_eq!(read_input(&mut reader).await.unwrap(), Input::Invalid);
        assert_eq!(read_input(&mut reader).await.unwrap(), Input::Line("q".to_owned()));
        assert_eq!(read_input(&mut reader).await.unwrap(), Input::Eof);
    }
}
