//! Synthetic Sentinel-2 fixtures: single-band GeoTIFF "band images",
//! scene directory trees and GeoJSON / shapefile AOIs in UTM 33N.

#![allow(dead_code)]

use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::vector::{Geometry, LayerAccess, LayerOptions, OGRwkbGeometryType};
use gdal::{Dataset, DriverManager};
use ndarray::Array2;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const EPSG_UTM33N: u32 = 32633;
pub const RES: f64 = 20.0;
pub const ORIGIN_X: f64 = 300000.0;
pub const ORIGIN_Y: f64 = 5000000.0;

pub const SCENE_BANDS: [&str; 6] = ["B11", "B02", "B8A", "B05", "B04", "B03"];

/// Pixel pattern that differs per band and per position
pub fn pattern(seed: u16, width: usize, height: usize) -> Array2<u16> {
    Array2::from_shape_fn((height, width), |(r, c)| {
        seed * 1000 + ((r * 31 + c * 7) % 997) as u16
    })
}

pub fn constant(value: u16, width: usize, height: usize) -> Array2<u16> {
    Array2::from_elem((height, width), value)
}

/// Write a single-band u16 GeoTIFF with its top-left corner at (`origin_x`, `origin_y`)
pub fn write_raster(path: &Path, origin_x: f64, origin_y: f64, data: &Array2<u16>) {
    write_raster_epsg(path, origin_x, origin_y, data, EPSG_UTM33N);
}

pub fn write_raster_epsg(path: &Path, origin_x: f64, origin_y: f64, data: &Array2<u16>, epsg: u32) {
    let (height, width) = data.dim();
    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut dataset = driver
        .create_with_band_type::<u16, _>(path, width, height, 1)
        .unwrap();
    dataset
        .set_geo_transform(&[origin_x, RES, 0.0, origin_y, 0.0, -RES])
        .unwrap();
    dataset
        .set_spatial_ref(&SpatialRef::from_epsg(epsg).unwrap())
        .unwrap();

    let mut band = dataset.rasterband(1).unwrap();
    let mut buffer = Buffer::new((width, height), data.iter().copied().collect());
    band.write((0, 0), (width, height), &mut buffer).unwrap();
}

/// Read one band (1-based) of a u16 raster as rows x columns
pub fn read_band(dataset: &Dataset, band: usize) -> Array2<u16> {
    let (width, height) = dataset.raster_size();
    let buffer = dataset
        .rasterband(band)
        .unwrap()
        .read_as::<u16>((0, 0), (width, height), (width, height), None)
        .unwrap();
    Array2::from_shape_vec((height, width), buffer.into_iter().collect()).unwrap()
}

/// `<root>/<product>.SAFE/GRANULE/L2A_T33TTG/IMG_DATA/R20m`
pub fn band_dir(root: &Path, product: &str) -> PathBuf {
    root.join(format!("{}.SAFE", product))
        .join("GRANULE")
        .join("L2A_T33TTG_A018000")
        .join("IMG_DATA")
        .join("R20m")
}

/// Build a scene whose bands are `pattern(i + 1)` for `SCENE_BANDS[i]`.
///
/// Returns the scene directory.
pub fn make_scene(root: &Path, product: &str, width: usize, height: usize) -> PathBuf {
    let dir = band_dir(root, product);
    fs::create_dir_all(&dir).unwrap();
    for (i, band) in SCENE_BANDS.iter().enumerate() {
        let path = dir.join(format!("T33TTG_20190210T101101_{}_20m.tif", band));
        write_raster(&path, ORIGIN_X, ORIGIN_Y, &pattern(i as u16 + 1, width, height));
    }
    // non-band products living next to the bands
    write_raster(
        &dir.join("T33TTG_20190210T101101_SCL_20m.tif"),
        ORIGIN_X,
        ORIGIN_Y,
        &constant(4, width, height),
    );
    root.join(format!("{}.SAFE", product))
}

/// Seed used by `make_scene` for a band label
pub fn seed_of(band: &str) -> u16 {
    SCENE_BANDS.iter().position(|b| *b == band).unwrap() as u16 + 1
}

pub fn write_aoi(path: &Path, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
    write_aoi_epsg(path, min_x, min_y, max_x, max_y, EPSG_UTM33N);
}

pub fn write_aoi_epsg(path: &Path, min_x: f64, min_y: f64, max_x: f64, max_y: f64, epsg: u32) {
    let geojson = format!(
        r#"{{
  "type": "FeatureCollection",
  "crs": {{ "type": "name", "properties": {{ "name": "urn:ogc:def:crs:EPSG::{epsg}" }} }},
  "features": [
    {{
      "type": "Feature",
      "properties": {{ "name": "aoi" }},
      "geometry": {{
        "type": "Polygon",
        "coordinates": [[[{min_x}, {min_y}], [{max_x}, {min_y}], [{max_x}, {max_y}], [{min_x}, {max_y}], [{min_x}, {min_y}]]]
      }}
    }}
  ]
}}"#
    );
    fs::write(path, geojson).unwrap();
}

/// Rectangular polygon AOI as an ESRI shapefile, CRS written to the `.prj`
pub fn write_aoi_shp(path: &Path, min_x: f64, min_y: f64, max_x: f64, max_y: f64, epsg: u32) {
    let driver = DriverManager::get_driver_by_name("ESRI Shapefile").unwrap();
    let mut dataset = driver.create_vector_only(path).unwrap();
    let srs = SpatialRef::from_epsg(epsg).unwrap();
    let mut layer = dataset
        .create_layer(LayerOptions {
            name: "aoi",
            srs: Some(&srs),
            ty: OGRwkbGeometryType::wkbPolygon,
            ..Default::default()
        })
        .unwrap();
    let polygon = Geometry::from_wkt(&format!(
        "POLYGON (({min_x} {min_y}, {max_x} {min_y}, {max_x} {max_y}, {min_x} {max_y}, {min_x} {min_y}))"
    ))
    .unwrap();
    layer.create_feature(polygon).unwrap();
}

pub fn write_empty_aoi(path: &Path) {
    let geojson = format!(
        r#"{{
  "type": "FeatureCollection",
  "crs": {{ "type": "name", "properties": {{ "name": "urn:ogc:def:crs:EPSG::{EPSG_UTM33N}" }} }},
  "features": []
}}"#
    );
    fs::write(path, geojson).unwrap();
}

/// Zip the directory `src` into `zip_path`, with entries rooted at the directory name
pub fn zip_dir(src: &Path, zip_path: &Path) {
    let base = src.parent().unwrap();
    let mut writer = ZipWriter::new(File::create(zip_path).unwrap());
    let mut stack = vec![src.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            let name = path.strip_prefix(base).unwrap().to_string_lossy().replace('\\', "/");
            let mut data = Vec::new();
            File::open(&path).unwrap().read_to_end(&mut data).unwrap();
            writer.start_file(name, SimpleFileOptions::default()).unwrap();
            writer.write_all(&data).unwrap();
        }
    }
    writer.finish().unwrap();
}
