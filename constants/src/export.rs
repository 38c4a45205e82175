/// ASCII PLY header, followed by the vertex count line and the property list
pub const PLY_MAGIC: &str = "ply";
pub const PLY_FORMAT: &str = "format ascii 1.0";
pub const PLY_END_HEADER: &str = "end_header";

pub const PLY_VERTEX_PROPERTIES: &[&str] = &[
    "property float x",
    "property float y",
    "property float z",
    "property uchar red",
    "property uchar green",
    "property uchar blue",
    "property uchar alpha",
];
