/// Line-oriented OBJ geometry parser
///
/// Only `v`, `vn`, `usemtl` and `f` are consumed. Everything else, including
/// texture coordinates, is ignored. Records that cannot be read are skipped
/// with a warning instead of failing the whole asset. Unreadable `v`/`vn`
/// lines still take a table slot so later 1-based indices stay aligned.
use nom::{
    bytes::complete::take_till,
    character::complete::{char, digit1, space0, space1},
    combinator::{all_consuming, map_res, opt},
    multi::separated_list1,
    number::complete::float,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

/// Which material a face group is drawn with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialBinding {
    /// Faces that appeared before any `usemtl`
    Default,
    Named(String),
}

/// All faces bound to one material, already fan-triangulated
#[derive(Debug, Clone, PartialEq)]
pub struct FaceGroup {
    pub binding: MaterialBinding,
    /// 0-based vertex indices, three per triangle
    pub triangle_indices: Vec<usize>,
    /// One normal triple per entry of `triangle_indices`
    pub normal_data: Vec<f32>,
}

impl FaceGroup {
    fn new(binding: MaterialBinding) -> Self {
        Self {
            binding,
            triangle_indices: Vec::new(),
            normal_data: Vec::new(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_indices.len() / 3
    }
}

/// Parsed geometry before material resolution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjDocument {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// Ordered by first `usemtl` occurrence
    pub groups: Vec<FaceGroup>,
}

/// One `vertex/texture/normal` reference with 1-based indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FaceRef {
    vertex: usize,
    normal: Option<usize>,
}

struct ObjParser {
    document: ObjDocument,
    /// Group receiving faces; `None` until a `usemtl` or an unscoped face
    current: Option<usize>,
}

impl ObjParser {
    fn new() -> Self {
        Self {
            document: ObjDocument::default(),
            current: None,
        }
    }

    fn select(&mut self, binding: MaterialBinding) -> usize {
        let groups = &mut self.document.groups;
        let index = match groups.iter().position(|g| g.binding == binding) {
            Some(index) => index,
            None => {
                groups.push(FaceGroup::new(binding));
                groups.len() - 1
            }
        };
        self.current = Some(index);
        index
    }

    fn line(&mut self, number: usize, line: &str) {
        let (rest, keyword) = match keyword(line) {
            Ok(parsed) => parsed,
            Err(_) => return,
        };

        match keyword {
            "v" => {
                let position = table_entry(number, "vertex", line, rest);
                self.document.positions.push(position);
            }
            "vn" => {
                let normal = table_entry(number, "normal", line, rest);
                self.document.normals.push(normal);
            }
            "usemtl" => {
                let name = rest.trim();
                if name.is_empty() {
                    log::warn!("line {}: usemtl without a material name", number);
                } else {
                    self.select(MaterialBinding::Named(name.to_string()));
                }
            }
            "f" => match all_consuming(face)(rest) {
                Ok((_, refs)) => self.face(number, &refs),
                Err(_) => log::warn!("line {}: skipping malformed face '{}'", number, line),
            },
            _ => {}
        }
    }

    fn face(&mut self, number: usize, refs: &[FaceRef]) {
        if refs.len() < 3 {
            log::warn!("line {}: face has {} vertices, need at least 3", number, refs.len());
            return;
        }

        let mut vertices = Vec::with_capacity(refs.len());
        let mut normals = Vec::with_capacity(refs.len());
        for r in refs {
            let Some(vertex) = r.vertex.checked_sub(1) else {
                log::warn!("line {}: vertex index 0 is not valid", number);
                return;
            };
            let normal = match r.normal {
                None => [0.0; 3],
                Some(n) => match n.checked_sub(1).and_then(|n| self.document.normals.get(n)) {
                    Some(normal) => *normal,
                    None => {
                        log::warn!(
                            "line {}: normal {} is not defined ({} normals so far)",
                            number,
                            n,
                            self.document.normals.len()
                        );
                        return;
                    }
                },
            };
            vertices.push(vertex);
            normals.push(normal);
        }

        let index = match self.current {
            Some(index) => index,
            None => self.select(MaterialBinding::Default),
        };
        let group = &mut self.document.groups[index];

        // Fan around the first vertex: (0, j, j + 1)
        for j in 1..vertices.len() - 1 {
            for k in [0, j, j + 1] {
                group.triangle_indices.push(vertices[k]);
                group.normal_data.extend_from_slice(&normals[k]);
            }
        }
    }
}

/// Parse OBJ text into vertex/normal tables and material-tagged triangle groups
pub fn parse_obj(text: &str) -> ObjDocument {
    let mut parser = ObjParser::new();
    for (index, line) in text.lines().enumerate() {
        parser.line(index + 1, line.trim());
    }

    let document = parser.document;
    log::debug!(
        "Parsed OBJ: {} vertices, {} normals, {} groups",
        document.positions.len(),
        document.normals.len(),
        document.groups.len()
    );
    document
}

/// First three numbers of a `v`/`vn` record. Trailing values such as `w` or a
/// vertex color are ignored; an unreadable record becomes the origin.
fn table_entry(number: usize, kind: &str, line: &str, rest: &str) -> [f32; 3] {
    match vec3(rest) {
        Ok((_, v)) => v,
        Err(_) => {
            log::warn!("line {}: malformed {} '{}', using 0 0 0", number, kind, line);
            [0.0; 3]
        }
    }
}

fn keyword(input: &str) -> IResult<&str, &str> {
    terminated(take_till(char::is_whitespace), space0)(input)
}

fn vec3(input: &str) -> IResult<&str, [f32; 3]> {
    let (input, (x, _, y, _, z)) = tuple((float, space1, float, space1, float))(input)?;
    let (input, _) = space0(input)?;
    Ok((input, [x, y, z]))
}

fn index(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse)(input)
}

/// `v`, `v/t`, `v//n` or `v/t/n`; the texture field is skipped unread
fn face_ref(input: &str) -> IResult<&str, FaceRef> {
    let (input, vertex) = index(input)?;
    let (input, normal) = opt(preceded(
        pair(char('/'), take_till(|c: char| c == '/' || c.is_whitespace())),
        opt(preceded(char('/'), index)),
    ))(input)?;
    Ok((
        input,
        FaceRef {
            vertex,
            normal: normal.flatten(),
        },
    ))
}

fn face(input: &str) -> IResult<&str, Vec<FaceRef>> {
    terminated(separated_list1(space1, face_ref), space0)(input)
}
