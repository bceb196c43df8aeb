use imageproc::contours::Contour;
use imageproc::point::Point;
use imageproc::rect::Rect;

/// Gets the smallest axis-aligned rect containing every point of a contour.
pub fn get_contour_bounding_rect(contour: &Contour<u32>) -> Option<Rect> {
    let first = contour.points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for point in &contour.points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }
    Some(Rect::at(min_x as i32, min_y as i32).of_size(max_x - min_x + 1, max_y - min_y + 1))
}

pub fn center_of_rect(rect: &Rect) -> Point<f32> {
    Point::new(
        rect.left() as f32 + rect.width() as f32 / 2.0,
        rect.top() as f32 + rect.height() as f32 / 2.0,
    )
}

/// Moves a rect by the given offset.
pub fn translate_rect(rect: &Rect, dx: i32, dy: i32) -> Rect {
    Rect::at(rect.left() + dx, rect.top() + dy).of_size(rect.width(), rect.height())
}

/// Sorts rects into reading order: top edge first, then left edge. Exact
/// ties keep their incoming order.
pub fn sort_in_reading_order(rects: &mut [Rect]) {
    rects.sort_by_key(|r| (r.top(), r.left()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::contours::BorderType;

    #[test]
    fn test_contour_bounding_rect() {
        let contour = Contour {
            points: vec![
                Point::new(3, 4),
                Point::new(9, 4),
                Point::new(9, 10),
                Point::new(3, 10),
            ],
            border_type: BorderType::Outer,
            parent: None,
        };
        assert_eq!(
            get_contour_bounding_rect(&contour),
            Some(Rect::at(3, 4).of_size(7, 7))
        );

        let empty = Contour {
            points: vec![],
            border_type: BorderType::Outer,
            parent: None,
        };
        assert_eq!(get_contour_bounding_rect(&empty), None);
    }

    #[test]
    fn test_center_of_rect() {
        let center = center_of_rect(&Rect::at(10, 20).of_size(30, 40));
        assert_eq!((center.x, center.y), (25.0, 40.0));
    }

    #[test]
    fn test_sort_in_reading_order() {
        let mut rects = vec![
            Rect::at(50, 10).of_size(5, 5),
            Rect::at(0, 30).of_size(5, 5),
            Rect::at(10, 10).of_size(5, 5),
            Rect::at(10, 10).of_size(7, 7),
        ];
        sort_in_reading_order(&mut rects);
        assert_eq!(
            rects,
            vec![
                Rect::at(10, 10).of_size(5, 5),
                Rect::at(10, 10).of_size(7, 7),
                Rect::at(50, 10).of_size(5, 5),
                Rect::at(0, 30).of_size(5, 5),
            ]
        );
    }

    #[test]
    fn test_translate_rect() {
        assert_eq!(
            translate_rect(&Rect::at(1, 2).of_size(3, 4), 10, 540),
            Rect::at(11, 542).of_size(3, 4)
        );
    }
}
