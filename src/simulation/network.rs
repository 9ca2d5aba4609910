use std::collections::HashMap;

use crate::config::{LayoutConfig, NetworkConfig};
use crate::error::{SimError, SimResult};
use super::{Direction, DirectionSet, GridPos, Intersection, IntersectionId, Point, TurnGeometry};

const NODE: char = 'o';
const HORIZONTAL: char = '-';
const VERTICAL: char = '|';

/// Declarative grid description.
///
/// `diagram` is an ASCII drawing with nodes on even rows and columns:
///
/// ```text
/// o-o o
/// | | |
/// o-o-o
/// ```
///
/// `o` marks an intersection, `-` and `|` mark roads (both between nodes and
/// passing through an empty node slot), spaces are empty. `columns` gives the
/// x coordinate of every node column (increasing) and `rows` the z coordinate
/// of every node row from top to bottom (decreasing).
#[derive(Debug, Clone)]
pub struct GridLayout {
    columns: Vec<f32>,
    rows: Vec<f32>,
    diagram: Vec<Vec<char>>,
}

impl GridLayout {
    pub fn new(columns: Vec<f32>, rows: Vec<f32>, diagram: &[String]) -> SimResult<Self> {
        if columns.is_empty() || rows.is_empty() {
            return Err(SimError::Layout("grid needs at least one row and one column".into()));
        }
        if columns.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SimError::Layout("column coordinates must be strictly increasing".into()));
        }
        if rows.windows(2).any(|w| w[1] >= w[0]) {
            return Err(SimError::Layout("row coordinates must be strictly decreasing".into()));
        }

        let height = rows.len() * 2 - 1;
        let width = columns.len() * 2 - 1;
        if diagram.len() != height {
            return Err(SimError::Layout(format!(
                "diagram has {} lines, expected {} for {} rows",
                diagram.len(),
                height,
                rows.len()
            )));
        }

        let mut cells = Vec::with_capacity(height);
        for (i, line) in diagram.iter().enumerate() {
            let mut row: Vec<char> = line.trim_end().chars().collect();
            if row.len() > width {
                return Err(SimError::Layout(format!(
                    "diagram line {} is {} characters wide, expected at most {}",
                    i,
                    row.len(),
                    width
                )));
            }
            if let Some(bad) = row.iter().find(|c| !matches!(**c, NODE | HORIZONTAL | VERTICAL | ' ')) {
                return Err(SimError::Layout(format!("unexpected character '{}' on line {}", bad, i)));
            }
            row.resize(width, ' ');
            cells.push(row);
        }

        Ok(Self { columns, rows, diagram: cells })
    }

    pub fn from_config(config: &LayoutConfig) -> SimResult<Self> {
        Self::new(config.columns.clone(), config.rows.clone(), &config.cells)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn has_node(&self, (row, col): GridPos) -> bool {
        row < self.rows.len() && col < self.columns.len() && self.diagram[row * 2][col * 2] == NODE
    }

    pub fn center(&self, (row, col): GridPos) -> Point {
        Point::new(self.columns[col], self.rows[row])
    }

    /// Node positions in row-major order.
    pub fn nodes(&self) -> Vec<GridPos> {
        (0..self.rows.len())
            .flat_map(|row| (0..self.columns.len()).map(move |col| (row, col)))
            .filter(|pos| self.has_node(*pos))
            .collect()
    }

    /// Every road in the diagram, reported once from its left or upper end.
    pub fn links(&self) -> Vec<(GridPos, Direction, GridPos)> {
        let mut links = Vec::new();
        for pos in self.nodes() {
            if let Some(target) = self.scan(pos, Direction::Right) {
                links.push((pos, Direction::Right, target));
            }
            if let Some(target) = self.scan(pos, Direction::Down) {
                links.push((pos, Direction::Down, target));
            }
        }
        links
    }

    /// Sides of the node at `pos` that carry a road.
    pub fn connected_sides(&self, pos: GridPos) -> DirectionSet {
        let mut sides = DirectionSet::EMPTY;
        if !self.has_node(pos) {
            return sides;
        }
        for (from, direction, to) in self.links() {
            if from == pos {
                sides.insert(direction);
            }
            if to == pos {
                sides.insert(direction.reverse());
            }
        }
        sides
    }

    fn scan(&self, (row, col): GridPos, direction: Direction) -> Option<GridPos> {
        let (road, mut y, mut x) = match direction {
            Direction::Right => (HORIZONTAL, row * 2, col * 2 + 1),
            Direction::Down => (VERTICAL, row * 2 + 1, col * 2),
            _ => return None,
        };

        while y < self.diagram.len() && x < self.diagram[y].len() {
            let cell = self.diagram[y][x];
            let on_node_slot = y % 2 == 0 && x % 2 == 0;
            if on_node_slot && cell == NODE {
                return Some((y / 2, x / 2));
            }
            if cell != road {
                return None;
            }
            match direction {
                Direction::Right => x += 1,
                _ => y += 1,
            }
        }
        None
    }
}

/// Two-phase network construction: nodes first, then deferred links.
#[derive(Debug)]
pub struct RoadNetworkBuilder {
    name: String,
    geometry: TurnGeometry,
    intersections: Vec<Intersection>,
    pending_links: Vec<(IntersectionId, Direction, IntersectionId)>,
}

impl RoadNetworkBuilder {
    pub fn new(geometry: TurnGeometry) -> Self {
        Self {
            name: String::from("unnamed"),
            geometry,
            intersections: Vec::new(),
            pending_links: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn add_intersection(&mut self, center: Point) -> IntersectionId {
        let id = IntersectionId(self.intersections.len());
        self.intersections.push(Intersection::new(id, center, self.geometry));
        id
    }

    pub fn add_grid_intersection(&mut self, center: Point, position: GridPos) -> IntersectionId {
        let id = IntersectionId(self.intersections.len());
        self.intersections
            .push(Intersection::new(id, center, self.geometry).with_grid_position(position));
        id
    }

    /// Records a two-way road; `to` may not exist yet.
    pub fn link(&mut self, from: IntersectionId, direction: Direction, to: IntersectionId) -> &mut Self {
        self.pending_links.push((from, direction, to));
        self
    }

    pub fn build(mut self) -> SimResult<RoadNetwork> {
        let links = std::mem::take(&mut self.pending_links);
        for (from, direction, to) in links {
            self.apply_link(from, direction, to)?;
        }

        let grid_index = self
            .intersections
            .iter()
            .filter_map(|i| i.grid_position().map(|pos| (pos, i.id())))
            .collect();

        let network = RoadNetwork {
            name: self.name,
            geometry: self.geometry,
            intersections: self.intersections,
            grid_index,
        };

        log::info!(
            "Built road network '{}': {} intersections, {} roads",
            network.name,
            network.len(),
            network.road_count()
        );
        Ok(network)
    }

    fn apply_link(&mut self, from: IntersectionId, direction: Direction, to: IntersectionId) -> SimResult<()> {
        let len = self.intersections.len();
        for id in [from, to] {
            if id.0 >= len {
                return Err(SimError::UnknownIntersection(id));
            }
        }
        if from == to {
            return Err(SimError::LinkConflict { intersection: from, direction });
        }

        let back = direction.reverse();
        for (node, side, other) in [(from, direction, to), (to, back, from)] {
            match self.intersections[node.0].neighbor_in_direction(side) {
                Some(existing) if existing != other => {
                    return Err(SimError::LinkConflict { intersection: node, direction: side });
                }
                _ => {}
            }
        }

        self.intersections[from.0].connect(direction, to)?;
        self.intersections[to.0].connect(back, from)?;
        Ok(())
    }
}

/// Immutable road graph owning every intersection.
#[derive(Debug, Clone)]
pub struct RoadNetwork {
    name: String,
    geometry: TurnGeometry,
    intersections: Vec<Intersection>,
    grid_index: HashMap<GridPos, IntersectionId>,
}

impl RoadNetwork {
    pub fn builder(geometry: TurnGeometry) -> RoadNetworkBuilder {
        RoadNetworkBuilder::new(geometry)
    }

    pub fn from_layout(layout: &GridLayout, geometry: TurnGeometry) -> SimResult<Self> {
        Self::assemble(RoadNetworkBuilder::new(geometry), layout)
    }

    pub fn from_config(config: &NetworkConfig) -> SimResult<Self> {
        let geometry = TurnGeometry::from_config(&config.network.geometry);
        let layout = GridLayout::from_config(&config.network.layout)?;
        Self::assemble(RoadNetworkBuilder::new(geometry).name(config.network.name.as_str()), &layout)
    }

    fn assemble(mut builder: RoadNetworkBuilder, layout: &GridLayout) -> SimResult<Self> {
        let mut ids = HashMap::new();
        for pos in layout.nodes() {
            let id = builder.add_grid_intersection(layout.center(pos), pos);
            ids.insert(pos, id);
        }
        for (from, direction, to) in layout.links() {
            builder.link(ids[&from], direction, ids[&to]);
        }
        builder.build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> &TurnGeometry {
        &self.geometry
    }

    pub fn get(&self, id: IntersectionId) -> SimResult<&Intersection> {
        self.intersections.get(id.0).ok_or(SimError::UnknownIntersection(id))
    }

    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    pub fn at_grid(&self, row: usize, col: usize) -> Option<IntersectionId> {
        self.grid_index.get(&(row, col)).copied()
    }

    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    pub fn road_count(&self) -> usize {
        self.intersections.iter().map(Intersection::degree).sum::<usize>() / 2
    }
}
