/// Record array parser
///
/// Reads the fixed-shape record array used for trajectory input:
///
/// ```text
/// [{"lat":48.480512,"lon":32.271152,"time":1743465601}, ...]
/// ```
///
/// Each object carries exactly the keys `lat`, `lon` and `time` (any order,
/// each once). Whitespace is allowed between tokens. Numbers are plain
/// decimals: optional leading `-`, digits, and for coordinates at most one
/// fractional part. No exponents, no `+`, no escapes, no trailing commas.
/// Anything else rejects the whole document with `CleanError::InvalidInput`.

use tracing::debug;

use crate::error::{CleanError, Result};
use crate::trajectory::{Coordinate, Fix, Trajectory};

/// Narrow seam between the pipeline and the input grammar.
pub trait TrajectoryReader {
    fn read<C: Coordinate>(&self, input: &str) -> Result<Trajectory<C>>;
}

/// Hand-rolled reader for the record array grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordArrayReader;

impl TrajectoryReader for RecordArrayReader {
    fn read<C: Coordinate>(&self, input: &str) -> Result<Trajectory<C>> {
        parse_trajectory(input)
    }
}

pub fn parse_trajectory<C: Coordinate>(input: &str) -> Result<Trajectory<C>> {
    let mut cursor = Cursor::new(input);
    let trajectory = cursor.array()?;

    cursor.skip_whitespace();
    if !cursor.at_end() {
        return Err(cursor.reject("trailing content after array"));
    }

    debug!(fixes = trajectory.len(), "parsed record array");
    Ok(trajectory)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Lat,
    Lon,
    Time,
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Cursor { src, pos: 0 }
    }

    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Position stays in the log only; callers see a bare `InvalidInput`.
    fn reject(&self, reason: &str) -> CleanError {
        debug!(position = self.pos, reason, "record array rejected");
        CleanError::InvalidInput
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        self.skip_whitespace();
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.reject("unexpected character"))
        }
    }

    /// Consumes `byte` if it is the next non-whitespace character.
    fn eat(&mut self, byte: u8) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn array<C: Coordinate>(&mut self) -> Result<Trajectory<C>> {
        self.expect(b'[')?;
        let mut trajectory = Trajectory::new();

        if self.eat(b']') {
            return Ok(trajectory);
        }

        loop {
            trajectory.push(self.record()?);
            if self.eat(b',') {
                continue;
            }
            self.expect(b']')?;
            return Ok(trajectory);
        }
    }

    fn record<C: Coordinate>(&mut self) -> Result<Fix<C>> {
        self.expect(b'{')?;

        let mut latitude = None;
        let mut longitude = None;
        let mut timestamp = None;

        for index in 0..3 {
            if index > 0 {
                self.expect(b',')?;
            }
            let key = self.key()?;
            self.expect(b':')?;
            self.skip_whitespace();

            match key {
                Key::Lat if latitude.is_none() => latitude = Some(self.coordinate()?),
                Key::Lon if longitude.is_none() => longitude = Some(self.coordinate()?),
                Key::Time if timestamp.is_none() => timestamp = Some(self.integer()?),
                _ => return Err(self.reject("duplicate key")),
            }
        }

        self.expect(b'}')?;

        match (latitude, longitude, timestamp) {
            (Some(lat), Some(lon), Some(time)) => Ok(Fix::new(lat, lon, time)),
            _ => Err(self.reject("missing key")),
        }
    }

    fn key(&mut self) -> Result<Key> {
        self.expect(b'"')?;
        let start = self.pos;

        loop {
            match self.peek() {
                Some(b'"') => break,
                Some(b'\\') | None => return Err(self.reject("unterminated or escaped key")),
                Some(_) => self.pos += 1,
            }
        }

        let name = &self.src[start..self.pos];
        self.pos += 1;

        match name {
            "lat" => Ok(Key::Lat),
            "lon" => Ok(Key::Lon),
            "time" => Ok(Key::Time),
            _ => Err(self.reject("unknown key")),
        }
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// `-?[0-9]+`, optionally followed by `\.[0-9]+` when `allow_fraction`.
    fn number_token(&mut self, allow_fraction: bool) -> Result<&'a str> {
        let start = self.pos;

        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        if self.digits() == 0 {
            return Err(self.reject("expected digits"));
        }
        if allow_fraction && self.peek() == Some(b'.') {
            self.pos += 1;
            if self.digits() == 0 {
                return Err(self.reject("expected fractional digits"));
            }
        }

        Ok(&self.src[start..self.pos])
    }

    fn coordinate<C: Coordinate>(&mut self) -> Result<C> {
        let token = self.number_token(true)?;
        C::from_token(token).ok_or_else(|| self.reject("coordinate out of range for format"))
    }

    fn integer(&mut self) -> Result<i64> {
        let token = self.number_token(false)?;
        token.parse::<i64>().map_err(|_| self.reject("timestamp out of range"))
    }
}
