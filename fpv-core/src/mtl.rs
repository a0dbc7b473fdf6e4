/// Material library parser (`newmtl` / `Kd` blocks)
use nom::{
    bytes::complete::tag,
    character::complete::{space0, space1},
    number::complete::float,
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::MaterialError;
use crate::vector::Vector3;

const BLOCK_START: &str = "newmtl";

/// A named diffuse material
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSpec {
    pub name: String,
    pub diffuse_color: Vector3,
}

impl MaterialSpec {
    pub const DEFAULT_NAME: &'static str = "NoMat";

    pub fn new(name: impl Into<String>, diffuse_color: Vector3) -> Self {
        Self {
            name: name.into(),
            diffuse_color,
        }
    }

    /// Flat magenta, used for faces declared before any `usemtl`
    pub fn default_material() -> Self {
        Self::new(Self::DEFAULT_NAME, Vector3::new(1.0, 0.0, 1.0))
    }
}

/// Materials keyed by name, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialLibrary {
    materials: Vec<MaterialSpec>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a material file.
    ///
    /// Malformed blocks are logged, returned alongside the library and skipped.
    pub fn parse(text: &str) -> (Self, Vec<MaterialError>) {
        let mut library = Self::new();
        let mut errors = Vec::new();

        for block in split_blocks(text) {
            match parse_block(&block) {
                Ok(Some(material)) => {
                    if let Err(err) = library.insert(material) {
                        errors.push(err);
                    }
                }
                Ok(None) => {}
                Err(err) => errors.push(err),
            }
        }

        for err in &errors {
            log::warn!("Skipping material block: {}", err);
        }
        log::debug!(
            "Parsed {} materials ({} skipped)",
            library.len(),
            errors.len()
        );

        (library, errors)
    }

    /// Add a material; a name that is already present is rejected
    pub fn insert(&mut self, material: MaterialSpec) -> Result<(), MaterialError> {
        if self.get(&material.name).is_some() {
            return Err(MaterialError::Duplicate {
                name: material.name,
            });
        }
        self.materials.push(material);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&MaterialSpec> {
        self.materials.iter().find(|m| m.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialSpec> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// Lines from one `newmtl` statement up to the next
struct Block<'a> {
    /// Text after `newmtl`; `None` for the lines before the first statement
    header: Option<&'a str>,
    lines: Vec<&'a str>,
}

/// Remainder of a line whose first token is exactly `keyword`
fn statement<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then_some(rest)
}

fn split_blocks(text: &str) -> Vec<Block<'_>> {
    let mut blocks = vec![Block {
        header: None,
        lines: Vec::new(),
    }];
    for line in text.lines().map(str::trim) {
        match statement(line, BLOCK_START) {
            Some(header) => blocks.push(Block {
                header: Some(header),
                lines: Vec::new(),
            }),
            None => {
                if let Some(block) = blocks.last_mut() {
                    block.lines.push(line);
                }
            }
        }
    }
    blocks
}

/// One `newmtl` block. `Ok(None)` means the block held neither a name nor a color.
fn parse_block(block: &Block<'_>) -> Result<Option<MaterialSpec>, MaterialError> {
    let name = block
        .header
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    let mut diffuse = None;
    let mut malformed_color = false;
    for line in &block.lines {
        if let Some(rest) = statement(line, "Kd") {
            match parse_color(rest) {
                Ok((_, color)) => diffuse = Some(color),
                Err(_) => malformed_color = true,
            }
        }
    }

    match (name, diffuse) {
        (Some(name), Some(diffuse_color)) => Ok(Some(MaterialSpec {
            name,
            diffuse_color,
        })),
        (Some(name), None) if malformed_color => Err(MaterialError::InvalidColor { name }),
        (Some(name), None) => Err(MaterialError::MissingColor { name }),
        (None, Some(_)) => Err(MaterialError::MissingName),
        (None, None) if malformed_color => Err(MaterialError::MissingName),
        (None, None) => Ok(None),
    }
}

fn parse_color(input: &str) -> IResult<&str, Vector3> {
    let (input, (r, g, b)) = tuple((
        preceded(space1, float),
        preceded(space1, float),
        preceded(space1, float),
    ))(input)?;
    let (input, _) = space0(input)?;
    Ok((input, Vector3::new(r, g, b)))
}

/// Name of the library referenced by an OBJ `mtllib` line, if any
pub fn mtllib_reference(obj_text: &str) -> Option<&str> {
    obj_text.lines().find_map(|line| {
        let line = line.trim();
        let (rest, _) = tag::<_, _, nom::error::Error<&str>>("mtllib")(line).ok()?;
        let (name, _) = space1::<_, nom::error::Error<&str>>(rest).ok()?;
        let name = name.trim();
        (!name.is_empty()).then_some(name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = "\
# Blender MTL File
newmtl Red
Ns 250.0
Kd 0.75 0.125 0.125
Ks 0.5 0.5 0.5

newmtl Floor
Kd 0.25 0.5 0.25
";

    #[test]
    fn test_parse_library() {
        let (library, errors) = MaterialLibrary::parse(LIBRARY);
        assert!(errors.is_empty());
        assert_eq!(library.len(), 2);

        let red = library.get("Red").unwrap();
        assert_eq!(red.diffuse_color, Vector3::new(0.75, 0.125, 0.125));
        let names: Vec<_> = library.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Red", "Floor"]);
    }

    #[test]
    fn test_malformed_blocks_are_skipped() {
        let text = "newmtl NoColor\nNs 10\nnewmtl Good\nKd 1 1 1\nnewmtl Broken\nKd 1 x\n";
        let (library, errors) = MaterialLibrary::parse(text);
        assert_eq!(library.len(), 1);
        assert!(library.get("Good").is_some());
        assert_eq!(
            errors,
            vec![
                MaterialError::MissingColor {
                    name: "NoColor".into()
                },
                MaterialError::InvalidColor {
                    name: "Broken".into()
                },
            ]
        );
    }

    #[test]
    fn test_color_without_name() {
        let (library, errors) = MaterialLibrary::parse("Kd 0.5 0.5 0.5\nnewmtl A\nKd 0 0 1\n");
        assert_eq!(library.len(), 1);
        assert_eq!(errors, vec![MaterialError::MissingName]);
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let (library, errors) = MaterialLibrary::parse("newmtl A\nKd 1 0 0\nnewmtl A\nKd 0 1 0\n");
        assert_eq!(library.len(), 1);
        assert_eq!(library.get("A").unwrap().diffuse_color, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(errors, vec![MaterialError::Duplicate { name: "A".into() }]);
    }

    #[test]
    fn test_newmtl_only_starts_a_block_as_first_token() {
        let text = "\
# newmtl Ghost
newmtl Plain
Kd 0.5 0.5 0.5
newmtl Oldnewmtl
Kd 0 0 1
";
        let (library, errors) = MaterialLibrary::parse(text);
        assert!(errors.is_empty());
        let names: Vec<_> = library.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Plain", "Oldnewmtl"]);
        assert_eq!(
            library.get("Oldnewmtl").unwrap().diffuse_color,
            Vector3::new(0.0, 0.0, 1.0)
        );
    }

    #[test]
    fn test_empty_text() {
        let (library, errors) = MaterialLibrary::parse("");
        assert!(library.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_mtllib_reference() {
        assert_eq!(mtllib_reference("# x\nmtllib cube.mtl\nv 0 0 0\n"), Some("cube.mtl"));
        assert_eq!(mtllib_reference("v 0 0 0\n"), None);
    }
}
