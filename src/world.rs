use thiserror::Error;

use crate::entities::DecorationKind;

/// Static occupancy grid. 0 = empty, anything else is a wall variant.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMap {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl GridMap {
    /// Callers are expected to pass a bordered map; `Level::parse` checks it.
    pub fn new(width: usize, height: usize, cells: Vec<u8>) -> Result<Self, MapError> {
        if cells.len() != width * height {
            return Err(MapError::CellCount {
                expected: width * height,
                found: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Empty interior surrounded by a one-cell wall ring.
    pub fn bordered(width: usize, height: usize) -> Self {
        let mut cells = vec![0; width * height];
        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    cells[y * width + x] = 1;
                }
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Out-of-range cells read as solid.
    #[inline]
    pub fn cell(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return 1;
        }
        self.cells[y as usize * self.width + x as usize]
    }

    #[inline]
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.cell(x, y) != 0
    }

    /// Whether the cell containing a world point is empty.
    #[inline]
    pub fn is_open_at(&self, p: [f32; 2]) -> bool {
        !self.is_wall(p[0].floor() as i32, p[1].floor() as i32)
    }

    pub fn set(&mut self, x: usize, y: usize, code: u8) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = code;
        }
    }

    /// Centers of every empty cell.
    pub fn open_cells(&self) -> impl Iterator<Item = [f32; 2]> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).filter_map(move |x| {
                (self.cells[y * self.width + x] == 0).then(|| [x as f32 + 0.5, y as f32 + 0.5])
            })
        })
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum MapError {
    #[error("map is empty")]
    Empty,
    #[error("row {row} has width {found}, expected {expected}")]
    Ragged {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("unknown glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },
    #[error("border cell ({x}, {y}) is not solid")]
    OpenBorder { x: usize, y: usize },
    #[error("map has no player spawn `P`")]
    MissingSpawn,
    #[error("map has more than one player spawn")]
    DuplicateSpawn,
    #[error("{found} cells given for a grid of {expected}")]
    CellCount { expected: usize, found: usize },
}

/// Static decoration placement as read from the layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub pos: [f32; 2],
    pub kind: DecorationKind,
}

/// A parsed level: the grid plus the things that sit on it at session start.
#[derive(Debug, Clone)]
pub struct Level {
    pub map: GridMap,
    pub spawn: [f32; 2],
    pub decorations: Vec<Placement>,
}

const BUILTIN: &str = "\
########################
#P.....#.........2.....#
#......#..T......2..s..#
#..s...#.........2.....#
#......###..######.....#
#......................#
#...T.........T........#
#..........3...........#
##2222.....3.....#######
#..........3...........#
#......s...............#
#...........T.....s....#
#..T...................#
######.....#####.......#
#..........#...#...T...#
#...s......#...#.......#
#..........#...........#
#......T...............#
#..............22222...#
#...3..............2...#
#...3......s.......2.T.#
#...3..............2...#
#......................#
########################";

impl Level {
    pub fn builtin() -> Self {
        Self::parse(BUILTIN).expect("built-in level is well formed")
    }

    /// Parse an ASCII layout.
    ///
    /// `#` and `1`-`9` are walls (`#` is variant 1), `.` and space are floor,
    /// `P` marks the player spawn, `T` a tall decoration, `s` a short one.
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.trim().is_empty())
            .collect();
        if rows.is_empty() {
            return Err(MapError::Empty);
        }

        let width = rows[0].chars().count();
        let height = rows.len();
        let mut cells = vec![0u8; width * height];
        let mut spawn = None;
        let mut decorations = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(MapError::Ragged {
                    row: y,
                    found,
                    expected: width,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let center = [x as f32 + 0.5, y as f32 + 0.5];
                let code = match glyph {
                    '#' => 1,
                    '1'..='9' => glyph as u8 - b'0',
                    '.' | ' ' => 0,
                    'P' => {
                        if spawn.replace(center).is_some() {
                            return Err(MapError::DuplicateSpawn);
                        }
                        0
                    }
                    'T' | 's' => {
                        let kind = if glyph == 'T' {
                            DecorationKind::Tall
                        } else {
                            DecorationKind::Short
                        };
                        decorations.push(Placement { pos: center, kind });
                        0
                    }
                    _ => return Err(MapError::UnknownGlyph { glyph, x, y }),
                };
                let border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                if border && code == 0 {
                    return Err(MapError::OpenBorder { x, y });
                }
                cells[y * width + x] = code;
            }
        }

        Ok(Self {
            map: GridMap::new(width, height, cells)?,
            spawn: spawn.ok_or(MapError::MissingSpawn)?,
            decorations,
        })
    }
}
