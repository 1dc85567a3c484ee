//! Virtual file overlay and module map documents.

use cxindex::error::OverlayError;
use cxindex::project::{ModuleMapDescriptor, VirtualFileOverlay};

fn overlay(mappings: &[(&str, &str)]) -> VirtualFileOverlay {
    let mut overlay = VirtualFileOverlay::new();
    for (virtual_path, real_path) in mappings {
        overlay.add_file_mapping(virtual_path, real_path).unwrap();
    }
    overlay
}

#[test]
fn test_basic() {
    let expected = r#"{
  'version': 0,
  'roots': [
    {
      'type': 'directory',
      'name': "/path/virtual",
      'contents': [
        {
          'type': 'file',
          'name': "foo.h",
          'external-contents': "/real/foo.h"
        }
      ]
    }
  ]
}
"#;
    let overlay = overlay(&[("/path/virtual/foo.h", "/real/foo.h")]);
    assert_eq!(overlay.write_to_buffer(), expected);
}

#[test]
fn test_unicode_is_escaped() {
    let expected = r#"{
  'version': 0,
  'roots': [
    {
      'type': 'directory',
      'name': "/path/\u266B",
      'contents': [
        {
          'type': 'file',
          'name': "\u2602.h",
          'external-contents': "/real/\u2602.h"
        }
      ]
    }
  ]
}
"#;
    let overlay = overlay(&[("/path/♫/☂.h", "/real/☂.h")]);
    assert_eq!(overlay.write_to_buffer(), expected);
}

#[test]
fn test_unclean_virtual_path_is_rejected() {
    let mut overlay = VirtualFileOverlay::new();
    assert!(matches!(
        overlay.add_file_mapping("/path/./virtual/../foo.h", "/real/foo.h"),
        Err(OverlayError::InvalidArguments(_))
    ));
    assert!(matches!(
        overlay.add_file_mapping("relative/foo.h", "/real/foo.h"),
        Err(OverlayError::InvalidArguments(_))
    ));
}

#[test]
fn test_remap_directories() {
    let expected = r#"{
  'version': 0,
  'roots': [
    {
      'type': 'directory',
      'name': "/another/dir",
      'contents': [
        {
          'type': 'file',
          'name': "foo2.h",
          'external-contents': "/real/foo2.h"
        }
      ]
    },
    {
      'type': 'directory',
      'name': "/path/virtual/dir",
      'contents': [
        {
          'type': 'file',
          'name': "foo1.h",
          'external-contents': "/real/foo1.h"
        },
        {
          'type': 'file',
          'name': "foo3.h",
          'external-contents': "/real/foo3.h"
        },
        {
          'type': 'directory',
          'name': "in/subdir",
          'contents': [
            {
              'type': 'file',
              'name': "foo4.h",
              'external-contents': "/real/foo4.h"
            }
          ]
        }
      ]
    }
  ]
}
"#;
    let overlay = overlay(&[
        ("/path/virtual/dir/foo1.h", "/real/foo1.h"),
        ("/another/dir/foo2.h", "/real/foo2.h"),
        ("/path/virtual/dir/foo3.h", "/real/foo3.h"),
        ("/path/virtual/dir/in/subdir/foo4.h", "/real/foo4.h"),
    ]);
    assert_eq!(overlay.write_to_buffer(), expected);
}

#[test]
fn test_case_insensitive() {
    let expected = r#"{
  'version': 0,
  'case-sensitive': 'false',
  'roots': [
    {
      'type': 'directory',
      'name': "/path/virtual",
      'contents': [
        {
          'type': 'file',
          'name': "foo.h",
          'external-contents': "/real/foo.h"
        }
      ]
    }
  ]
}
"#;
    let mut overlay = overlay(&[("/path/virtual/foo.h", "/real/foo.h")]);
    overlay.set_case_sensitivity(false);
    assert_eq!(overlay.write_to_buffer(), expected);
}

#[test]
fn test_shared_prefix_is_not_a_parent() {
    let expected = r#"{
  'version': 0,
  'roots': [
    {
      'type': 'directory',
      'name': "/path/foo",
      'contents': [
        {
          'type': 'file',
          'name': "bar",
          'external-contents': "/real/bar"
        },
        {
          'type': 'file',
          'name': "bar.h",
          'external-contents': "/real/bar.h"
        }
      ]
    },
    {
      'type': 'directory',
      'name': "/path/foobar",
      'contents': [
        {
          'type': 'file',
          'name': "baz.h",
          'external-contents': "/real/baz.h"
        }
      ]
    },
    {
      'type': 'directory',
      'name': "/path",
      'contents': [
        {
          'type': 'file',
          'name': "foobarbaz.h",
          'external-contents': "/real/foobarbaz.h"
        }
      ]
    }
  ]
}
"#;
    let overlay = overlay(&[
        ("/path/foo/bar.h", "/real/bar.h"),
        ("/path/foo/bar", "/real/bar"),
        ("/path/foobar/baz.h", "/real/baz.h"),
        ("/path/foobarbaz.h", "/real/foobarbaz.h"),
    ]);
    assert_eq!(overlay.write_to_buffer(), expected);
}

#[test]
fn test_adjacent_directory() {
    let expected = r#"{
  'version': 0,
  'roots': [
    {
      'type': 'directory',
      'name': "/path/dir1",
      'contents': [
        {
          'type': 'file',
          'name': "foo.h",
          'external-contents': "/real/foo.h"
        },
        {
          'type': 'directory',
          'name': "subdir",
          'contents': [
            {
              'type': 'file',
              'name': "bar.h",
              'external-contents': "/real/bar.h"
            }
          ]
        }
      ]
    },
    {
      'type': 'directory',
      'name': "/path/dir2",
      'contents': [
        {
          'type': 'file',
          'name': "baz.h",
          'external-contents': "/real/baz.h"
        }
      ]
    }
  ]
}
"#;
    let overlay = overlay(&[
        ("/path/dir1/foo.h", "/real/foo.h"),
        ("/path/dir1/subdir/bar.h", "/real/bar.h"),
        ("/path/dir2/baz.h", "/real/baz.h"),
    ]);
    assert_eq!(overlay.write_to_buffer(), expected);
}

#[test]
fn test_top_level() {
    let expected = r#"{
  'version': 0,
  'roots': [
    {
      'type': 'directory',
      'name': "/",
      'contents': [
        {
          'type': 'file',
          'name': "foo.h",
          'external-contents': "/real/foo.h"
        }
      ]
    }
  ]
}
"#;
    let overlay = overlay(&[("/foo.h", "/real/foo.h")]);
    assert_eq!(overlay.write_to_buffer(), expected);
}

#[test]
fn test_empty() {
    let expected = "{\n  'version': 0,\n  'roots': [\n  ]\n}\n";
    assert_eq!(VirtualFileOverlay::new().write_to_buffer(), expected);
}

#[test]
fn test_module_map_descriptor() {
    let expected = "framework module TestFrame {\n  umbrella header \"TestFrame.h\"\n\n  export *\n  module * { export * }\n}\n";
    let mut descriptor = ModuleMapDescriptor::new();
    descriptor.set_framework_module_name("TestFrame").unwrap();
    descriptor.set_umbrella_header("TestFrame.h").unwrap();
    assert_eq!(descriptor.write_to_buffer().unwrap(), expected);
}

#[test]
fn test_module_map_descriptor_needs_name_and_header() {
    let mut descriptor = ModuleMapDescriptor::new();
    assert!(descriptor.write_to_buffer().is_err());
    assert!(descriptor.set_framework_module_name("").is_err());
    descriptor.set_framework_module_name("TestFrame").unwrap();
    assert!(matches!(
        descriptor.write_to_buffer(),
        Err(OverlayError::InvalidArguments(_))
    ));
}
