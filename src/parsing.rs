use rgb::RGB8;

/// Parses a coordinate or a sequence number.
///
/// Returns `None` for anything that is not a finite number, the caller decides what to drop.
pub fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Parses a `(longitude, latitude)` pair, telling which field is wrong if any
pub fn parse_position<'a>(
    longitude: (&'a str, &'a str),
    latitude: (&'a str, &'a str),
) -> Result<(f64, f64), (&'a str, &'a str)> {
    let lon = parse_float(longitude.1).ok_or(longitude)?;
    let lat = parse_float(latitude.1).ok_or(latitude)?;
    Ok((lon, lat))
}

/// Parses a `RRGGBB` route color, an empty value means no color
pub fn parse_color(s: &str) -> Result<Option<RGB8>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let s = s.strip_prefix('#').unwrap_or(s);
    if s.len() != 6 || !s.is_ascii() {
        return Err(s.to_owned());
    }
    let r = u8::from_str_radix(&s[0..2], 16).map_err(|_| s.to_owned())?;
    let g = u8::from_str_radix(&s[2..4], 16).map_err(|_| s.to_owned())?;
    let b = u8::from_str_radix(&s[4..6], 16).map_err(|_| s.to_owned())?;
    Ok(Some(RGB8::new(r, g, b)))
}

pub fn color_to_hex(color: &RGB8) -> String {
    format!("{:02X}{:02X}{:02X}", color.r, color.g, color.b)
}

#[test]
fn test_parse_float() {
    assert_eq!(Some(-121.74), parse_float("-121.74"));
    assert_eq!(Some(38.5), parse_float(" 38.5 "));
    assert_eq!(Some(3.0), parse_float("3"));
    assert_eq!(None, parse_float(""));
    assert_eq!(None, parse_float("12abc"));
    assert_eq!(None, parse_float("NaN"));
    assert_eq!(None, parse_float("inf"));
}

#[test]
fn test_parse_position() {
    assert_eq!(
        Ok((-121.7, 38.5)),
        parse_position(("stop_lon", "-121.7"), ("stop_lat", "38.5"))
    );
    assert_eq!(
        Err(("stop_lat", "")),
        parse_position(("stop_lon", "-121.7"), ("stop_lat", ""))
    );
}

#[test]
fn test_parse_color() {
    assert_eq!(Ok(None), parse_color(""));
    assert_eq!(Ok(Some(RGB8::new(255, 0, 16))), parse_color("ff0010"));
    assert_eq!(Ok(Some(RGB8::new(0, 0, 0))), parse_color("#000000"));
    assert_eq!(Err("red".to_owned()), parse_color("red"));
    assert_eq!(Err("zz0000".to_owned()), parse_color("zz0000"));
    assert_eq!("FF0010", color_to_hex(&RGB8::new(255, 0, 16)));
}
