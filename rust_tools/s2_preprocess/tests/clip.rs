mod common;

use common::*;
use gdal::Dataset;
use ndarray::s;
use s2_preprocess::{clip_raster, Aoi, OutputOptions, PreprocessError};
use std::fs;

#[test]
fn test_clip_to_aoi_at_native_resolution() {
    let tmp = tempfile::tempdir().unwrap();
    // 10 x 10 km tile at 20 m
    let source = pattern(3, 500, 500);
    let raster = tmp.path().join("scene_stacked.tif");
    write_raster(&raster, ORIGIN_X, ORIGIN_Y, &source);

    // 2 x 2 km AOI, 1 km right of and 3 km below the tile corner
    let aoi_path = tmp.path().join("aoi.geojson");
    write_aoi(
        &aoi_path,
        ORIGIN_X + 1000.0,
        ORIGIN_Y - 5000.0,
        ORIGIN_X + 3000.0,
        ORIGIN_Y - 3000.0,
    );
    let aoi = Aoi::load(&aoi_path).unwrap();

    let out_dir = tmp.path().join("clipped");
    fs::create_dir_all(&out_dir).unwrap();
    let output = clip_raster(&raster, &aoi, &out_dir, &OutputOptions::default()).unwrap();
    assert_eq!(output, out_dir.join("scene_stacked_aoi.tif"));

    let dataset = Dataset::open(&output).unwrap();
    assert_eq!(dataset.raster_size(), (100, 100));
    assert_eq!(
        dataset.geo_transform().unwrap(),
        [ORIGIN_X + 1000.0, RES, 0.0, ORIGIN_Y - 3000.0, 0.0, -RES]
    );

    let clipped = read_band(&dataset, 1);
    // rows 150..250 and columns 50..150 of the source grid
    assert_eq!(clipped, source.slice(s![150..250, 50..150]).to_owned());
}

#[test]
fn test_clip_never_enlarges_raster_inside_aoi() {
    let tmp = tempfile::tempdir().unwrap();
    let source = pattern(1, 50, 40);
    let raster = tmp.path().join("small.tif");
    write_raster(&raster, ORIGIN_X, ORIGIN_Y, &source);

    let aoi_path = tmp.path().join("aoi.geojson");
    write_aoi(
        &aoi_path,
        ORIGIN_X - 5000.0,
        ORIGIN_Y - 5000.0,
        ORIGIN_X + 5000.0,
        ORIGIN_Y + 5000.0,
    );
    let aoi = Aoi::load(&aoi_path).unwrap();

    let output = clip_raster(&raster, &aoi, tmp.path(), &OutputOptions::default()).unwrap();
    let dataset = Dataset::open(&output).unwrap();
    assert_eq!(dataset.raster_size(), (50, 40));
    assert_eq!(dataset.geo_transform().unwrap()[1], RES);
    assert_eq!(read_band(&dataset, 1), source);
}

#[test]
fn test_clip_rejects_crs_mismatch() {
    let tmp = tempfile::tempdir().unwrap();
    let raster = tmp.path().join("scene.tif");
    write_raster(&raster, ORIGIN_X, ORIGIN_Y, &constant(1, 20, 20));

    let aoi_path = tmp.path().join("aoi.geojson");
    write_aoi_epsg(
        &aoi_path,
        ORIGIN_X,
        ORIGIN_Y - 200.0,
        ORIGIN_X + 200.0,
        ORIGIN_Y,
        32634,
    );
    let aoi = Aoi::load(&aoi_path).unwrap();

    let err = clip_raster(&raster, &aoi, tmp.path(), &OutputOptions::default()).unwrap_err();
    assert!(matches!(err, PreprocessError::CoordinateSystemMismatch { .. }));
    assert!(!tmp.path().join("scene_aoi.tif").exists());
}

#[test]
fn test_clip_aoi_outside_raster() {
    let tmp = tempfile::tempdir().unwrap();
    let raster = tmp.path().join("scene.tif");
    write_raster(&raster, ORIGIN_X, ORIGIN_Y, &constant(1, 20, 20));

    let aoi_path = tmp.path().join("aoi.geojson");
    write_aoi(
        &aoi_path,
        ORIGIN_X + 50000.0,
        ORIGIN_Y - 2000.0,
        ORIGIN_X + 52000.0,
        ORIGIN_Y,
    );
    let aoi = Aoi::load(&aoi_path).unwrap();

    let err = clip_raster(&raster, &aoi, tmp.path(), &OutputOptions::default()).unwrap_err();
    assert!(matches!(err, PreprocessError::AoiOutsideRaster(_)));
}

#[test]
fn test_clip_unopenable_raster() {
    let tmp = tempfile::tempdir().unwrap();
    let raster = tmp.path().join("corrupt.tif");
    fs::write(&raster, b"garbage").unwrap();

    let aoi_path = tmp.path().join("aoi.geojson");
    write_aoi(&aoi_path, ORIGIN_X, ORIGIN_Y - 200.0, ORIGIN_X + 200.0, ORIGIN_Y);
    let aoi = Aoi::load(&aoi_path).unwrap();

    let err = clip_raster(&raster, &aoi, tmp.path(), &OutputOptions::default()).unwrap_err();
    assert!(matches!(err, PreprocessError::InvalidRasterData { .. }));
}

#[test]
fn test_aoi_loads_first_feature_envelope() {
    let tmp = tempfile::tempdir().unwrap();
    let aoi_path = tmp.path().join("aoi.geojson");
    write_aoi(&aoi_path, 1.0, 2.0, 3.0, 5.0);

    let aoi = Aoi::load(&aoi_path).unwrap();
    assert_eq!(aoi.feature_count, 1);
    assert_eq!(aoi.geometry_name.to_ascii_uppercase(), "POLYGON");
    assert_eq!(
        (aoi.envelope.min_x, aoi.envelope.min_y, aoi.envelope.max_x, aoi.envelope.max_y),
        (1.0, 2.0, 3.0, 5.0)
    );
    assert!(aoi.spatial_ref_wkt.is_some());
}

#[test]
fn test_aoi_without_features_is_invalid() {
    let tmp = tempfile::tempdir().unwrap();
    let aoi_path = tmp.path().join("empty.geojson");
    write_empty_aoi(&aoi_path);

    let err = Aoi::load(&aoi_path).unwrap_err();
    assert!(matches!(err, PreprocessError::InvalidVectorData(_)));
}

#[test]
fn test_aoi_missing_file() {
    let tmp = tempfile::tempdir().unwrap();
    let err = Aoi::load(&tmp.path().join("aoi.shp")).unwrap_err();
    assert!(matches!(err, PreprocessError::MissingInput(_)));
}

#[test]
fn test_clip_sliver_overlap_yields_one_pixel() {
    let tmp = tempfile::tempdir().unwrap();
    // 400 m wide tile; AOI covers only its last 5 m to the east
    let raster = tmp.path().join("scene.tif");
    write_raster(&raster, ORIGIN_X, ORIGIN_Y, &constant(1, 20, 20));

    let aoi_path = tmp.path().join("aoi.geojson");
    write_aoi(
        &aoi_path,
        ORIGIN_X + 395.0,
        ORIGIN_Y - 200.0,
        ORIGIN_X + 1000.0,
        ORIGIN_Y - 100.0,
    );
    let aoi = Aoi::load(&aoi_path).unwrap();

    let output = clip_raster(&raster, &aoi, tmp.path(), &OutputOptions::default()).unwrap();
    let dataset = Dataset::open(&output).unwrap();
    assert_eq!(dataset.raster_size(), (1, 5));
    assert_eq!(
        dataset.geo_transform().unwrap(),
        [ORIGIN_X + 395.0, RES, 0.0, ORIGIN_Y - 100.0, 0.0, -RES]
    );
}

#[test]
fn test_aoi_loads_shapefile() {
    let tmp = tempfile::tempdir().unwrap();
    let aoi_path = tmp.path().join("aoi.shp");
    write_aoi_shp(
        &aoi_path,
        ORIGIN_X + 1000.0,
        ORIGIN_Y - 3000.0,
        ORIGIN_X + 3000.0,
        ORIGIN_Y - 1000.0,
        EPSG_UTM33N,
    );
    assert!(tmp.path().join("aoi.prj").exists());

    let aoi = Aoi::load(&aoi_path).unwrap();
    assert_eq!(aoi.feature_count, 1);
    assert_eq!(aoi.geometry_name.to_ascii_uppercase(), "POLYGON");
    assert_eq!(
        (aoi.envelope.min_x, aoi.envelope.min_y, aoi.envelope.max_x, aoi.envelope.max_y),
        (
            ORIGIN_X + 1000.0,
            ORIGIN_Y - 3000.0,
            ORIGIN_X + 3000.0,
            ORIGIN_Y - 1000.0
        )
    );
    assert!(aoi.spatial_ref_wkt.is_some());
}

#[test]
fn test_clip_with_shapefile_aoi() {
    let tmp = tempfile::tempdir().unwrap();
    let source = pattern(4, 250, 250);
    let raster = tmp.path().join("scene_stacked.tif");
    write_raster(&raster, ORIGIN_X, ORIGIN_Y, &source);

    let aoi_path = tmp.path().join("aoi.shp");
    write_aoi_shp(
        &aoi_path,
        ORIGIN_X + 1000.0,
        ORIGIN_Y - 3000.0,
        ORIGIN_X + 3000.0,
        ORIGIN_Y - 1000.0,
        EPSG_UTM33N,
    );
    let aoi = Aoi::load(&aoi_path).unwrap();

    let output = clip_raster(&raster, &aoi, tmp.path(), &OutputOptions::default()).unwrap();
    let dataset = Dataset::open(&output).unwrap();
    assert_eq!(dataset.raster_size(), (100, 100));
    assert_eq!(
        read_band(&dataset, 1),
        source.slice(s![50..150, 50..150]).to_owned()
    );
}

#[test]
fn test_clip_rejects_shapefile_in_other_zone() {
    let tmp = tempfile::tempdir().unwrap();
    let raster = tmp.path().join("scene.tif");
    write_raster(&raster, ORIGIN_X, ORIGIN_Y, &constant(1, 20, 20));

    let aoi_path = tmp.path().join("aoi.shp");
    write_aoi_shp(&aoi_path, ORIGIN_X, ORIGIN_Y - 200.0, ORIGIN_X + 200.0, ORIGIN_Y, 32634);
    let aoi = Aoi::load(&aoi_path).unwrap();

    let err = clip_raster(&raster, &aoi, tmp.path(), &OutputOptions::default()).unwrap_err();
    assert!(matches!(err, PreprocessError::CoordinateSystemMismatch { .. }));
}
